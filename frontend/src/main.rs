mod api;
mod components;
mod store;

use api::GeminiClient;
use components::controls::Controls;
use components::viewer::NovelViewer;
use store::{State, StoreContext};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
struct AppProps {
    client: GeminiClient,
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    let store = use_reducer(State::default);

    html! {
        <ContextProvider<StoreContext> context={store}>
            <div class="app-container">
                <aside class="sidebar-container">
                    <Controls client={props.client.clone()} />
                </aside>
                <main class="main-stage">
                    <NovelViewer />
                </main>
            </div>
        </ContextProvider<StoreContext>>
    }
}

/// Shown instead of the app when the API key is missing at build time.
#[function_component(ConfigError)]
fn config_error() -> Html {
    html! {
        <div class="config-error">
            <h2>{"설정 오류"}</h2>
            <p>{"GEMINI_API_KEY가 설정되지 않았습니다. 키를 설정한 뒤 다시 빌드해주세요."}</p>
        </div>
    }
}

fn main() {
    match GeminiClient::from_env() {
        Ok(client) => {
            yew::Renderer::<App>::with_props(AppProps { client }).render();
        }
        Err(error) => {
            tracing::error!("startup failed: {error}");
            yew::Renderer::<ConfigError>::new().render();
        }
    }
}
