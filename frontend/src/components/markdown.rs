use pulldown_cmark::{Event, Options, Parser, Tag};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct MarkdownProps {
    pub content: String,
}

/// Renders the draft as markdown, covering the prose constructs web novels
/// actually use. Anything else degrades to its inner text.
#[function_component(Markdown)]
pub fn markdown(props: &MarkdownProps) -> Html {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);

    let parser = Parser::new_ext(&props.content, options);
    let events = parser.collect::<Vec<_>>();
    render_events(&mut events.into_iter())
}

fn render_events<'a>(events: &mut impl Iterator<Item = Event<'a>>) -> Html {
    let mut nodes = Vec::new();

    while let Some(event) = events.next() {
        match event {
            Event::Start(tag) => nodes.push(render_tag(tag, events)),
            Event::End(_) => break,
            Event::Text(text) => nodes.push(html! { {text.as_ref()} }),
            Event::Code(code) => nodes.push(html! { <code>{code.as_ref()}</code> }),
            Event::SoftBreak => nodes.push(html! { " " }),
            Event::HardBreak => nodes.push(html! { <br/> }),
            Event::Rule => nodes.push(html! { <hr/> }),
            _ => {}
        }
    }

    html! { { for nodes } }
}

fn render_tag<'a>(tag: Tag<'a>, events: &mut impl Iterator<Item = Event<'a>>) -> Html {
    let content = render_events(events);
    match tag {
        Tag::Paragraph => html! { <p>{content}</p> },
        Tag::Heading { level, .. } => {
            let tag_name = format!("h{}", level as u8);
            html! { <@{tag_name}>{content}</@> }
        }
        Tag::BlockQuote(_) => html! { <blockquote>{content}</blockquote> },
        Tag::List(first_num) => {
            if let Some(num) = first_num {
                html! { <ol start={num.to_string()}>{content}</ol> }
            } else {
                html! { <ul>{content}</ul> }
            }
        }
        Tag::Item => html! { <li>{content}</li> },
        Tag::Emphasis => html! { <em>{content}</em> },
        Tag::Strong => html! { <strong>{content}</strong> },
        Tag::Strikethrough => html! { <del>{content}</del> },
        _ => html! { {content} },
    }
}
