use crate::models::{
    Content, GenerateContentRequest, GenerationConfig, HarmBlockThreshold, HarmCategory,
    NovelSettings, SafetySetting,
};

/// Fixed model used for drafting. Chosen for long-form creative output.
pub const MODEL: &str = "gemini-3-pro-preview";

/// Fixed sampling parameters: high creativity, generous output ceiling.
pub const TEMPERATURE: f32 = 0.9;
pub const TOP_K: u32 = 40;
pub const TOP_P: f32 = 0.95;
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

/// At most this many characters of the style reference are embedded in the
/// prompt, regardless of how much text was imported.
pub const STYLE_REFERENCE_MAX_CHARS: usize = 3000;

const SYSTEM_INSTRUCTION: &str = "\
You are a world-class web novel author known for high engagement, deep immersion, and vivid descriptions.
Your goal is to write a compelling story segment based on the user's synopsis.

KEY GUIDELINES:
1. **Show, Don't Tell**: Do not just describe emotions; depict actions, sensory details, and internal reactions that reveal them.
2. **Pacing**: Maintain a rhythm that fits the genre. Fast in action, slow in introspection.
3. **Formatting**: Use standard web novel formatting with clear paragraph breaks for readability.
4. **POV Adherence**: Strictly stick to the requested Point of View.
5. **Style Mimicry**: If reference text is provided, analyze its sentence structure, tone, and vocabulary choice, and apply that style to the new story.
6. **Immersion**: The story should feel real and grounded, even in fantasy settings.";

/// Builds the single user-turn instruction text from the settings.
///
/// The synopsis is embedded verbatim. The style-reference block is included
/// only when the reference is non-blank, truncated to
/// [`STYLE_REFERENCE_MAX_CHARS`] characters between explicit markers.
pub fn build_prompt(settings: &NovelSettings) -> String {
    let style_instruction = if settings.reference_text.trim().is_empty() {
        String::new()
    } else {
        let excerpt: String = settings
            .reference_text
            .chars()
            .take(STYLE_REFERENCE_MAX_CHARS)
            .collect();
        format!(
            "\n=== STYLE REFERENCE START ===\n{excerpt}...\n=== STYLE REFERENCE END ===\n\n\
             INSTRUCTION: Analyze the writing style (sentence length, vocabulary, tone) of the \
             reference above and write the story using a similar style.\n"
        )
    };

    let tone = if settings.is_mature {
        "Mature, raw, and unfiltered (Adult/19+ themes allowed where appropriate to the plot)."
    } else {
        "Standard web novel tone."
    };

    format!(
        "Write a web novel chapter/segment based on the following details.\n\n\
         **Synopsis/Plot Outline:**\n{synopsis}\n\n\
         **Requirements:**\n\
         - **Language:** Korean (한국어)\n\
         - **Point of View:** {pov}\n\
         - **Target Length:** Approximately {length} Korean characters (공백 포함 {length}자 내외). \
         Ensure the story is detailed and immersive to meet this length.\n\
         - **Content Tone:** {tone}\n\
         {style_instruction}\n\
         Begin the story now. Do not write an intro like \"Here is the story\". \
         Just start writing the novel in Korean.",
        synopsis = settings.synopsis,
        pov = settings.pov.label(),
        length = settings.target_length,
    )
}

/// Threshold set for the four harm categories, keyed only by the mature flag.
/// Hard blocks applied by the provider for illegal content cannot be bypassed
/// and surface as ordinary request errors.
pub fn safety_settings(is_mature: bool) -> Vec<SafetySetting> {
    let threshold = if is_mature {
        HarmBlockThreshold::BlockNone
    } else {
        HarmBlockThreshold::BlockLowAndAbove
    };
    HarmCategory::ALL
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold,
        })
        .collect()
}

/// Assembles the complete request body for one generation attempt.
pub fn build_request(settings: &NovelSettings) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(build_prompt(settings))],
        system_instruction: Content::system(SYSTEM_INSTRUCTION),
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            top_k: TOP_K,
            top_p: TOP_P,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        },
        safety_settings: safety_settings(settings.is_mature),
    }
}
