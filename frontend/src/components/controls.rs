use crate::api::{CancelToken, GeminiClient};
use crate::store::{Action, StoreContext};
use shared::models::{
    NovelSettings, Pov, TARGET_LENGTH_MAX, TARGET_LENGTH_MIN, TARGET_LENGTH_STEP,
};
use uuid::Uuid;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

/// Reference imports above this size are rejected before reading; the prompt
/// only ever embeds the first 3000 characters anyway.
const MAX_IMPORT_BYTES: f64 = 1_048_576.0;

#[derive(Properties, PartialEq)]
pub struct ControlsProps {
    pub client: GeminiClient,
}

/// Left panel: settings editor plus the generation trigger.
#[function_component(Controls)]
pub fn controls(props: &ControlsProps) -> Html {
    let store = use_context::<StoreContext>().expect("Store context not found");
    let file_input_ref = use_node_ref();
    let import_error = use_state(|| Option::<&'static str>::None);
    // Token of the stream currently in flight, so a new trigger can cancel it.
    let active_cancel = use_mut_ref(|| Option::<CancelToken>::None);

    let on_synopsis_input = {
        let store = store.clone();
        Callback::from(move |e: InputEvent| {
            let textarea: HtmlTextAreaElement = e.target_unchecked_into();
            store.dispatch(Action::UpdateSettings(NovelSettings {
                synopsis: textarea.value(),
                ..store.settings.clone()
            }));
        })
    };

    let on_pov_change = {
        let store = store.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Some(pov) = Pov::from_id(&select.value()) {
                store.dispatch(Action::UpdateSettings(NovelSettings {
                    pov,
                    ..store.settings.clone()
                }));
            }
        })
    };

    let on_length_input = {
        let store = store.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Ok(target_length) = input.value().parse::<u32>() {
                store.dispatch(Action::UpdateSettings(NovelSettings {
                    target_length,
                    ..store.settings.clone()
                }));
            }
        })
    };

    let on_reference_input = {
        let store = store.clone();
        Callback::from(move |e: InputEvent| {
            let textarea: HtmlTextAreaElement = e.target_unchecked_into();
            store.dispatch(Action::UpdateSettings(NovelSettings {
                reference_text: textarea.value(),
                ..store.settings.clone()
            }));
        })
    };

    let on_mature_change = {
        let store = store.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            store.dispatch(Action::UpdateSettings(NovelSettings {
                is_mature: input.checked(),
                ..store.settings.clone()
            }));
        })
    };

    let on_upload_click = {
        let file_input_ref = file_input_ref.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(input) = file_input_ref.cast::<HtmlInputElement>() {
                input.click();
            }
        })
    };

    let on_file_change = {
        let store = store.clone();
        let import_error = import_error.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            // Reset so selecting the same file again re-fires the event.
            input.set_value("");

            if file.size() > MAX_IMPORT_BYTES {
                import_error.set(Some("파일이 너무 큽니다. 1MB 이하의 txt 파일을 선택해주세요."));
                return;
            }

            let store = store.clone();
            let import_error = import_error.clone();
            yew::platform::spawn_local(async move {
                match JsFuture::from(file.text()).await {
                    Ok(value) => {
                        if let Some(text) = value.as_string() {
                            import_error.set(None);
                            store.dispatch(Action::SetReferenceText(text));
                        } else {
                            import_error.set(Some("텍스트 파일로 읽을 수 없습니다."));
                        }
                    }
                    Err(e) => {
                        tracing::error!("reference file import failed: {e:?}");
                        import_error.set(Some("파일을 읽는 중 오류가 발생했습니다."));
                    }
                }
            });
        })
    };

    let on_generate = {
        let store = store.clone();
        let client = props.client.clone();
        let active_cancel = active_cancel.clone();
        Callback::from(move |_: MouseEvent| {
            // Settings are snapshotted here; edits during the stream do not
            // affect the request already sent.
            let settings = store.settings.clone();
            if !settings.can_generate() {
                return;
            }

            if let Some(previous) = active_cancel.borrow_mut().take() {
                previous.cancel();
            }
            let cancel = CancelToken::default();
            *active_cancel.borrow_mut() = Some(cancel.clone());

            let session_id = Uuid::new_v4();
            store.dispatch(Action::StartSession(session_id));

            let store = store.clone();
            let client = client.clone();
            yew::platform::spawn_local(async move {
                let on_fragment = {
                    let store = store.clone();
                    move |text: String| {
                        store.dispatch(Action::AppendFragment { session_id, text });
                    }
                };

                match client.stream_novel(&settings, cancel, on_fragment).await {
                    Ok(()) => store.dispatch(Action::FinishSession(session_id)),
                    Err(error) => {
                        tracing::error!("novel generation failed: {error}");
                        store.dispatch(Action::FailSession { session_id, error });
                    }
                }
            });
        })
    };

    let settings = &store.settings;
    let generate_disabled = store.is_generating || !settings.can_generate();

    html! {
        <div class="controls-panel">
            <div class="controls-header">
                <h2 class="controls-title">{"NovelCraft AI"}</h2>
                <p class="controls-subtitle">{"Create immersive stories with Gemini"}</p>
            </div>

            <div class="form-group">
                <label class="form-label">{"시놉시스 / 줄거리"}</label>
                <textarea
                    class="form-textarea synopsis-input"
                    placeholder="주인공은 사실 마왕이었는데, 용사와 사랑에 빠져서..."
                    value={settings.synopsis.clone()}
                    oninput={on_synopsis_input}
                />
            </div>

            <div class="form-group">
                <label class="form-label">{"시점 (Point of View)"}</label>
                <select class="form-select" onchange={on_pov_change}>
                    { for Pov::ALL.iter().map(|pov| html! {
                        <option value={pov.id()} selected={*pov == settings.pov}>
                            {pov.label()}
                        </option>
                    })}
                </select>
            </div>

            <div class="form-group">
                <div class="form-label-row">
                    <label class="form-label">{"목표 분량 (글자 수)"}</label>
                    <span class="form-value">{format!("{} 자", settings.target_length)}</span>
                </div>
                <input
                    type="range"
                    class="form-range"
                    min={TARGET_LENGTH_MIN.to_string()}
                    max={TARGET_LENGTH_MAX.to_string()}
                    step={TARGET_LENGTH_STEP.to_string()}
                    value={settings.target_length.to_string()}
                    oninput={on_length_input}
                />
            </div>

            <div class="form-group">
                <div class="form-label-row">
                    <label class="form-label">{"학습용 원고 (스타일 모방)"}</label>
                    <button class="upload-btn" onclick={on_upload_click}>
                        {"txt 파일 업로드"}
                    </button>
                </div>
                <input
                    type="file"
                    ref={file_input_ref}
                    style="display: none;"
                    accept=".txt"
                    onchange={on_file_change}
                />
                <textarea
                    class="form-textarea reference-input"
                    placeholder="여기에 텍스트를 붙여넣거나 파일을 업로드하면, AI가 문체를 학습하여 비슷하게 작성합니다."
                    value={settings.reference_text.clone()}
                    oninput={on_reference_input}
                />
                if let Some(message) = *import_error {
                    <div class="import-error">{message}</div>
                }
            </div>

            <div class="form-group mature-toggle">
                <span class="mature-label">{"19+ (성인 모드)"}</span>
                <label class="switch">
                    <input
                        type="checkbox"
                        checked={settings.is_mature}
                        onchange={on_mature_change}
                    />
                    <span class="slider round"></span>
                </label>
            </div>

            <div class="controls-footer">
                <button
                    class="btn btn-primary generate-btn"
                    onclick={on_generate}
                    disabled={generate_disabled}
                >
                    if store.is_generating {
                        {"작성 중..."}
                    } else {
                        {"소설 생성하기"}
                    }
                </button>
            </div>
        </div>
    }
}
