use crate::api::GenerateError;
use crate::store::StoreContext;
use wasm_bindgen_futures::JsFuture;
use web_sys::wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, Element, HtmlAnchorElement, Url, js_sys};
use yew::prelude::*;

const DOWNLOAD_FILE_NAME: &str = "novel_draft.txt";

/// User-facing message per error kind; unknown kinds fall back to the
/// generic one. The underlying cause is never shown, only logged.
fn error_message(error: &GenerateError) -> &'static str {
    match error {
        GenerateError::MissingApiKey | GenerateError::Api { status: 401 | 403, .. } => {
            "API 키를 확인해주세요. 인증에 실패했습니다."
        }
        GenerateError::Blocked(_) => {
            "콘텐츠 안전 정책으로 인해 생성이 차단되었습니다. 설정을 바꾸어 다시 시도해주세요."
        }
        GenerateError::Network(_) => {
            "네트워크 오류가 발생했습니다. 연결을 확인하고 잠시 후 다시 시도해주세요."
        }
        _ => "소설 생성 중 오류가 발생했습니다. API 키를 확인하거나 잠시 후 다시 시도해주세요.",
    }
}

fn download_as_text(content: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;

    let parts = js_sys::Array::of1(&JsValue::from_str(content));
    let options = BlobPropertyBag::new();
    options.set_type("text/plain");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.unchecked_into();
    anchor.set_href(&url);
    anchor.set_download(DOWNLOAD_FILE_NAME);
    body.append_child(&anchor)?;
    anchor.click();
    body.remove_child(&anchor)?;
    Url::revoke_object_url(&url)?;
    Ok(())
}

/// Right panel: progressive view of the accumulated draft.
#[function_component(NovelViewer)]
pub fn novel_viewer() -> Html {
    let store = use_context::<StoreContext>().expect("Store context not found");
    let container_ref = use_node_ref();

    // Follow the latest content while the stream is open.
    {
        let container_ref = container_ref.clone();
        let is_generating = store.is_generating;
        use_effect_with((store.content.len(), is_generating), move |_| {
            if is_generating
                && let Some(div) = container_ref.cast::<Element>()
            {
                div.set_scroll_top(div.scroll_height());
            }
            || {}
        });
    }

    let on_copy = {
        let content = store.content.clone();
        Callback::from(move |_: MouseEvent| {
            let content = content.clone();
            yew::platform::spawn_local(async move {
                if let Some(window) = web_sys::window() {
                    let clipboard = window.navigator().clipboard();
                    let promise = clipboard.write_text(&content);
                    let _ = JsFuture::from(promise).await;
                }
            });
        })
    };

    let on_download = {
        let content = store.content.clone();
        Callback::from(move |_: MouseEvent| {
            if let Err(e) = download_as_text(&content) {
                tracing::error!("draft download failed: {e:?}");
            }
        })
    };

    // An error takes precedence over any partial content.
    if let Some(error) = &store.error {
        return html! {
            <div class="viewer viewer-error">
                <div class="error-icon">{"⚠"}</div>
                <h3 class="error-title">{"오류가 발생했습니다"}</h3>
                <p class="error-text">{error_message(error)}</p>
            </div>
        };
    }

    if store.content.is_empty() && !store.is_generating {
        return html! {
            <div class="viewer viewer-idle">
                <p>{"왼쪽 설정에서 시놉시스를 입력하고 생성을 시작하세요."}</p>
            </div>
        };
    }

    html! {
        <div class="viewer">
            <div class="viewer-toolbar">
                <button class="toolbar-btn" onclick={on_copy} title="복사하기">
                    <svg viewBox="0 0 24 24" width="18" height="18" fill="currentColor">
                        <path d="M16 1H4c-1.1 0-2 .9-2 2v14h2V3h12V1zm3 4H8c-1.1 0-2 .9-2 2v14c0 1.1.9 2 2 2h11c1.1 0 2-.9 2-2V7c0-1.1-.9-2-2-2zm0 16H8V7h11v14z"/>
                    </svg>
                </button>
                <button class="toolbar-btn" onclick={on_download} title="txt로 다운로드">
                    <svg viewBox="0 0 24 24" width="18" height="18" fill="currentColor">
                        <path d="M19 9h-4V3H9v6H5l7 7 7-7zM5 18v2h14v-2H5z"/>
                    </svg>
                </button>
            </div>

            <div class="viewer-scroll" ref={container_ref}>
                <div class="novel-text">
                    <super::markdown::Markdown content={store.content.clone()} />
                </div>

                if store.is_generating {
                    <div class="typing-indicator">
                        <span></span>
                        <span></span>
                        <span></span>
                    </div>
                }
            </div>
        </div>
    }
}
