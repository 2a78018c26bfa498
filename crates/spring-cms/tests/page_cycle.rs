// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Integration tests for the request pipeline: routing, component setup,
//! AJAX dispatch, partial scoping and rendering.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::tempdir;

use spring_cms::component::{factory, Factory};
use spring_cms::request::{HEADER_REQUEST_HANDLER, HEADER_REQUEST_PARTIALS};
use spring_cms::{
    AssetAttr, Capabilities, CatalogState, CmsError, CmsRequest, CmsResponse, Component, ComponentDetails,
    ComponentManager, Controller, ControllerOptions, FileSystemTheme, HandlerResponse, Handlers,
    MemoryTheme, Plugin, PluginDetails, Properties, Result, Theme, ViewAssets,
};

const PLUGIN_DIR: &str = "plugins/demo";

#[derive(Default)]
struct Todo {
    items: Vec<String>,
}

fn on_fetch_data(_: &mut Todo, _: &Properties, request: &CmsRequest) -> Result<HandlerResponse> {
    let payload: Value = serde_json::from_str(request.body_str().unwrap_or("{}"))?;
    Ok(HandlerResponse::data(json!({ "foo": payload["foo"] })))
}

fn on_add_item(todo: &mut Todo, _: &Properties, request: &CmsRequest) -> Result<HandlerResponse> {
    let item = request
        .form_value("item")
        .ok_or_else(|| CmsError::handler("OnAddItem", "missing item"))?;
    todo.items.push(item);
    Ok(HandlerResponse::data(json!({ "items": todo.items })))
}

fn on_count(todo: &mut Todo, _: &Properties, _: &CmsRequest) -> Result<HandlerResponse> {
    Ok(HandlerResponse::data(json!(todo.items.len())))
}

fn on_nothing(_: &mut Todo, _: &Properties, _: &CmsRequest) -> Result<HandlerResponse> {
    Ok(HandlerResponse::Empty)
}

fn on_summary(todo: &mut Todo, _: &Properties, _: &CmsRequest) -> Result<HandlerResponse> {
    #[derive(serde::Serialize)]
    struct Summary {
        total: usize,
    }
    HandlerResponse::record(&Summary {
        total: todo.items.len(),
    })
}

impl Component for Todo {
    const CAPABILITIES: Capabilities = Capabilities::INIT;

    fn details(&self) -> ComponentDetails {
        ComponentDetails::new("todo", "Todo Component").with_view_file("default")
    }

    fn handlers() -> Handlers<Self> {
        Handlers::new()
            .on("OnFetchData", on_fetch_data)
            .on("OnAddItem", on_add_item)
            .on("OnCount", on_count)
            .on("OnNothing", on_nothing)
            .on("OnSummary", on_summary)
    }

    fn init(&mut self, props: &Properties, assets: &mut ViewAssets) -> Result<()> {
        let max: usize = props
            .get("max")
            .map(|max| max.parse())
            .transpose()
            .map_err(|_| CmsError::component_init("todo", "max must be a number"))?
            .unwrap_or(10);
        self.items = (1..=max.min(2)).map(|i| format!("item {}", i)).collect();

        assets.add_js("js/todo.js", vec![AssetAttr::flag("defer")]);
        if let Some(style) = props.get("style") {
            assets.add_css(style.clone(), vec![]);
        }
        Ok(())
    }

    fn value(&self, key: &str) -> Option<String> {
        match key {
            "count" => Some(self.items.len().to_string()),
            _ => None,
        }
    }
}

/// Short-circuits the page when `redirect` is set.
#[derive(Default)]
struct Gate;

impl Component for Gate {
    const CAPABILITIES: Capabilities = Capabilities::RUN;

    fn details(&self) -> ComponentDetails {
        ComponentDetails::new("gate", "Gate")
    }

    fn on_run(&mut self, props: &Properties, _request: &CmsRequest) -> Option<String> {
        props
            .get("redirect")
            .filter(|target| !target.is_empty())
            .map(|target| format!("redirect:{}", target))
    }
}

/// Renders itself without a partial.
#[derive(Default)]
struct Badge;

impl Component for Badge {
    const CAPABILITIES: Capabilities = Capabilities::RENDER;

    fn details(&self) -> ComponentDetails {
        ComponentDetails::new("badge", "Badge")
    }

    fn on_render(&mut self, props: &Properties) -> Option<String> {
        Some(format!("<span>{}</span>", props.get("label")?))
    }
}

struct DemoPlugin;

impl Plugin for DemoPlugin {
    fn details(&self) -> PluginDetails {
        PluginDetails {
            code: "demo".into(),
            name: "Demo".into(),
            ..PluginDetails::default()
        }
    }

    fn dir(&self) -> PathBuf {
        PathBuf::from(PLUGIN_DIR)
    }

    fn register_components(&self) -> Vec<(String, Factory)> {
        vec![
            ("todo".to_string(), factory::<Todo>()),
            ("gate".to_string(), factory::<Gate>()),
            ("badge".to_string(), factory::<Badge>()),
        ]
    }
}

fn controller_with(theme: Arc<dyn Theme>) -> Controller {
    let manager = ComponentManager::new();
    manager.load([&DemoPlugin as &dyn Plugin]);
    Controller::new(
        Arc::new(CatalogState::new(theme)),
        Arc::new(manager),
        ControllerOptions::default(),
    )
}

fn demo_theme() -> MemoryTheme {
    MemoryTheme::new("demo")
        .with_layout("default", "<body>{{ page }}</body>")
        .with_page(
            "todo",
            "[cfg]\nurl = /todo/:list?\ntitle = Todo\n\n[todo]\nmax = 2\n[/cfg]\n<h1>{{ page.title }}</h1>{{ partial \"todo::items\" }}",
        )
        .with_partial("footer", "<footer>{{ todo.count }} items</footer>")
        .with_component_partial(PLUGIN_DIR, "todo/items", "<ul>{{ this.count }}</ul>")
        .with_component_partial(PLUGIN_DIR, "todo/default", "<ol>{{ this.count }}</ol>")
}

fn ajax(path: &str, handler: &str) -> CmsRequest {
    CmsRequest::new(path, "POST")
        .with_header("X-Requested-With", "XMLHttpRequest")
        .with_header(HEADER_REQUEST_HANDLER, handler)
}

fn json_body(response: &CmsResponse) -> &Value {
    response.json_body().expect("json response")
}

#[test]
fn test_full_page_render() {
    let controller = controller_with(Arc::new(demo_theme()));
    let response = controller.run(&CmsRequest::new("/todo", "GET")).unwrap();
    assert_eq!(
        response.html_body(),
        Some("<body><h1>Todo</h1><ul>2</ul></body>")
    );
}

#[test]
fn test_ajax_handler_merges_data_with_partials() {
    let controller = controller_with(Arc::new(demo_theme()));
    let request = ajax("/todo", "todo::OnFetchData")
        .with_header(HEADER_REQUEST_PARTIALS, "todo::items&footer&")
        .with_body(br#"{"foo": "bar"}"#.to_vec());

    let response = controller.run(&request).unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        json_body(&response),
        &json!({
            "foo": "bar",
            "todo::items": "<ul>2</ul>",
            "footer": "<footer>2 items</footer>",
        })
    );
}

#[test]
fn test_ajax_bare_handler_and_scalar_result() {
    let controller = controller_with(Arc::new(demo_theme()));
    let response = controller.run(&ajax("/todo", "OnCount")).unwrap();
    assert_eq!(json_body(&response), &json!({ "result": 2 }));
}

#[test]
fn test_ajax_record_is_whole_body() {
    let controller = controller_with(Arc::new(demo_theme()));
    let request = ajax("/todo", "todo::OnSummary").with_header(HEADER_REQUEST_PARTIALS, "footer");
    let response = controller.run(&request).unwrap();
    assert_eq!(json_body(&response), &json!({ "total": 2 }));
}

#[test]
fn test_ajax_noop_handler() {
    let controller = controller_with(Arc::new(demo_theme()));
    let request = ajax("/todo", "OnAjax").with_header(HEADER_REQUEST_PARTIALS, "footer");
    let response = controller.run(&request).unwrap();
    assert_eq!(json_body(&response), &json!({ "footer": "<footer>2 items</footer>" }));
}

#[test]
fn test_ajax_errors() {
    let controller = controller_with(Arc::new(demo_theme()));

    let err = controller.run(&ajax("/todo", "todo::fetch")).unwrap_err();
    assert!(matches!(err, CmsError::HandlerNameInvalid(_)));
    assert_eq!(err.status(), 400);

    let request = ajax("/todo", "OnCount").with_header(HEADER_REQUEST_PARTIALS, "footer&<script>");
    let err = controller.run(&request).unwrap_err();
    assert!(matches!(err, CmsError::PartialNameInvalid(ref name) if name == "<script>"));

    let err = controller.run(&ajax("/todo", "OnMissing")).unwrap_err();
    assert!(matches!(err, CmsError::HandlerNotFound(_)));
    assert_eq!(err.status(), 404);

    let err = controller.run(&ajax("/todo", "ghost::OnCount")).unwrap_err();
    assert!(matches!(err, CmsError::HandlerNotFound(_)));
}

#[test]
fn test_ajax_requires_post() {
    let controller = controller_with(Arc::new(demo_theme()));
    let request = CmsRequest::new("/todo", "GET")
        .with_header("X-Requested-With", "XMLHttpRequest")
        .with_header(HEADER_REQUEST_HANDLER, "OnCount");
    let response = controller.run(&request).unwrap();
    assert!(response.html_body().is_some());
}

#[test]
fn test_form_handler() {
    let controller = controller_with(Arc::new(demo_theme()));

    let request = CmsRequest::new("/todo", "POST")
        .with_form([("_handler", "todo::OnAddItem"), ("item", "milk")]);
    let response = controller.run(&request).unwrap();
    assert_eq!(
        json_body(&response),
        &json!({ "items": ["item 1", "item 2", "milk"] })
    );

    // Handlers returning nothing, or not found at all, fall through to the page.
    for handler in ["OnNothing", "OnMissing"] {
        let request = CmsRequest::new("/todo", "POST").with_form([("_handler", handler)]);
        let response = controller.run(&request).unwrap();
        assert_eq!(
            response.html_body(),
            Some("<body><h1>Todo</h1><ul>2</ul></body>")
        );
    }
}

#[test]
fn test_handler_error_aborts_request() {
    let controller = controller_with(Arc::new(demo_theme()));
    let request = CmsRequest::new("/todo", "POST").with_form([("_handler", "todo::OnAddItem")]);
    let err = controller.run(&request).unwrap_err();
    assert!(matches!(err, CmsError::Handler { .. }));
    assert_eq!(err.status(), 500);
}

#[test]
fn test_page_cycle_short_circuit() {
    let theme = MemoryTheme::new("demo")
        .with_layout("default", "[cfg]\n[gate]\nredirect = \"{{ :to }}\"\n[/cfg]\n<body>{{ page }}</body>")
        .with_page("go", "[cfg]\nurl = /go/:to?\n[/cfg]\n<p>stay</p>");
    let controller = controller_with(Arc::new(theme));

    let response = controller.run(&CmsRequest::new("/go/home", "GET")).unwrap();
    assert_eq!(response.html_body(), Some("redirect:home"));

    let response = controller.run(&CmsRequest::new("/go", "GET")).unwrap();
    assert_eq!(response.html_body(), Some("<body><p>stay</p></body>"));
}

#[test]
fn test_route_params_bind_component_properties() {
    let theme = MemoryTheme::new("demo").with_page(
        "tag",
        "[cfg]\nurl = /tag/:name\n\n[badge]\nlabel = \"{{ :name }}\"\n[/cfg]\n{{ component \"badge\" }}|{{ badge.label }}",
    );
    let controller = controller_with(Arc::new(theme));
    let response = controller.run(&CmsRequest::new("/tag/rust", "GET")).unwrap();
    assert_eq!(response.html_body(), Some("<span>rust</span>|rust"));
}

#[test]
fn test_component_render_falls_back_to_view_file() {
    let theme = demo_theme().with_page(
        "list",
        "[cfg]\nurl = /list\nlayout = default\n\n[todo]\n[/cfg]\n{{ component \"todo\" }}",
    );
    let controller = controller_with(Arc::new(theme));
    let response = controller.run(&CmsRequest::new("/list", "GET")).unwrap();
    assert_eq!(response.html_body(), Some("<body><ol>2</ol></body>"));
}

#[test]
fn test_component_render_with_overrides() {
    let theme = MemoryTheme::new("demo").with_page(
        "home",
        "[cfg]\nurl = /\n\n[badge]\nlabel = new\n[/cfg]\n{{ component \"badge\" label=\"hot\" }}",
    );
    let controller = controller_with(Arc::new(theme));
    let response = controller.run(&CmsRequest::new("/", "GET")).unwrap();
    assert_eq!(response.html_body(), Some("<span>hot</span>"));
}

#[test]
fn test_nested_partials_restore_scope() {
    let theme = MemoryTheme::new("demo")
        .with_page("home", "[cfg]\nurl = /\n[/cfg]\n{{ partial \"a\" x=\"1\" }}[{{ param.x }}]")
        .with_partial(
            "a",
            "[cfg]\n[badge]\nlabel = outer\n[/cfg]\n{{ param.x }}/{{ badge.label }}>{{ partial \"b\" x=\"2\" }}<{{ param.x }}/{{ badge.label }}",
        )
        .with_partial(
            "b",
            "[cfg]\n[badge]\nlabel = inner\n[/cfg]\n{{ param.x }}/{{ badge.label }}/{{ component \"badge\" }}",
        );
    let controller = controller_with(Arc::new(theme));

    let response = controller.run(&CmsRequest::new("/", "GET")).unwrap();
    assert_eq!(
        response.html_body(),
        Some("1/outer>2/inner/<span>inner</span><1/outer[]")
    );
}

#[test]
fn test_recursive_partials_stop_at_depth_limit() {
    let theme = MemoryTheme::new("demo")
        .with_page("home", "[cfg]\nurl = /\n[/cfg]\n{{ partial \"a\" x=\"1\" }}|{{ param.x }}|")
        .with_partial("a", "<a{{ param.x }}>{{ partial \"b\" }}</a{{ param.x }}>")
        .with_partial("b", "<b>{{ partial \"a\" x=\"2\" }}</b>");
    let controller = controller_with(Arc::new(theme));

    // 32 levels render: a and b alternate, the 33rd partial comes out empty.
    let expected = format!(
        "<a1><b>{}{}</b></a1>||",
        "<a2><b>".repeat(15),
        "</b></a2>".repeat(15)
    );
    let response = controller.run(&CmsRequest::new("/", "GET")).unwrap();
    assert_eq!(response.html_body(), Some(expected.as_str()));
}

#[test]
fn test_self_rendering_component_stops_at_depth_limit() {
    let theme = MemoryTheme::new("demo")
        .with_page("home", "[cfg]\nurl = /\n\n[todo]\n[/cfg]\nx{{ component \"todo\" }}y")
        .with_component_partial(PLUGIN_DIR, "todo/default", "<i>{{ component \"todo\" }}</i>");
    let controller = controller_with(Arc::new(theme));

    let expected = format!("x{}{}y", "<i>".repeat(32), "</i>".repeat(32));
    let response = controller.run(&CmsRequest::new("/", "GET")).unwrap();
    assert_eq!(response.html_body(), Some(expected.as_str()));
}

#[test]
fn test_unqualified_component_partial_resolution() {
    let theme = MemoryTheme::new("demo")
        .with_page(
            "home",
            "[cfg]\nurl = /\n\n[todo first]\nmax = 1\n\n[todo second]\nmax = 2\n[/cfg]\n[{{ partial \"::items\" }}][{{ component \"second\" }}][{{ component \"first\" }}]",
        )
        .with_component_partial(PLUGIN_DIR, "second/items", "items:{{ this.count }}")
        .with_component_partial(PLUGIN_DIR, "second/default", "<{{ partial \"::items\" }}>")
        .with_component_partial(PLUGIN_DIR, "first/default", "def:{{ this.count }}<{{ partial \"::items\" }}>");
    let controller = controller_with(Arc::new(theme));

    // Outside a component the first one providing the partial wins; inside
    // one only its own partials are considered.
    let response = controller.run(&CmsRequest::new("/", "GET")).unwrap();
    assert_eq!(response.html_body(), Some("[items:2][<items:2>][def:1<>]"));
}

#[test]
fn test_component_assets_in_layout() {
    let theme = MemoryTheme::new("demo")
        .with_layout(
            "default",
            "[cfg]\n[todo]\nstyle = css/layout.css\n[/cfg]\n<head>{{ styles }}{{ scripts }}</head>{{ page }}",
        )
        .with_page(
            "home",
            "[cfg]\nurl = /\n\n[todo]\nstyle = css/page.css\n[/cfg]\n{{ partial \"card\" }}",
        )
        .with_partial(
            "card",
            "[cfg]\n[todo extra]\nstyle = https://cdn.example.com/x.css\n[/cfg]\n<p>{{ extra.count }}</p>",
        );
    let controller = controller_with(Arc::new(theme));

    let expected = concat!(
        "<head>",
        "<link rel=\"stylesheet\" href=\"/themes/demo/assets/css/layout.css\">\n",
        "<link rel=\"stylesheet\" href=\"/themes/demo/assets/css/page.css\">\n",
        "<link rel=\"stylesheet\" href=\"https://cdn.example.com/x.css\">\n",
        "<script src=\"/themes/demo/assets/js/todo.js\" defer></script>\n",
        "</head><p>2</p>",
    );
    for _ in 0..2 {
        let response = controller.run(&CmsRequest::new("/", "GET")).unwrap();
        assert_eq!(response.html_body(), Some(expected));
    }
}

#[test]
fn test_partial_params_bind_component_properties() {
    let theme = MemoryTheme::new("demo")
        .with_page("home", "[cfg]\nurl = /\n[/cfg]\n{{ partial \"card\" tag=\"new\" }}")
        .with_partial(
            "card",
            "[cfg]\n[badge]\nlabel = \"{{ tag }}\"\n[/cfg]\n{{ component \"badge\" }}",
        );
    let controller = controller_with(Arc::new(theme));
    let response = controller.run(&CmsRequest::new("/", "GET")).unwrap();
    assert_eq!(response.html_body(), Some("<span>new</span>"));
}

#[test]
fn test_missing_partial_renders_empty() {
    let theme = MemoryTheme::new("demo")
        .with_page("home", "[cfg]\nurl = /\n[/cfg]\n[{{ partial \"nope\" }}][{{ partial \"ghost::x\" }}][{{ component \"ghost\" }}]");
    let controller = controller_with(Arc::new(theme));
    let response = controller.run(&CmsRequest::new("/", "GET")).unwrap();
    assert_eq!(response.html_body(), Some("[][][]"));
}

#[test]
fn test_unknown_component_fails_the_page() {
    let theme = MemoryTheme::new("demo").with_page("home", "[cfg]\nurl = /\n\n[ghost]\n[/cfg]\nx");
    let controller = controller_with(Arc::new(theme));
    let err = controller.run(&CmsRequest::new("/", "GET")).unwrap_err();
    assert!(matches!(err, CmsError::ComponentNotFound(ref name) if name == "ghost"));
}

#[test]
fn test_component_init_failure() {
    let theme = MemoryTheme::new("demo").with_page("home", "[cfg]\nurl = /\n\n[todo]\nmax = many\n[/cfg]\nx");
    let controller = controller_with(Arc::new(theme));
    let err = controller.run(&CmsRequest::new("/", "GET")).unwrap_err();
    assert!(matches!(err, CmsError::ComponentInit { .. }));
}

#[test]
fn test_template_helpers() {
    let theme = MemoryTheme::new("demo")
        .with_page(
            "blog/post",
            "[cfg]\nurl = /blog/:slug\n[/cfg]\n{{ page_url \"blog/post\" slug=route.slug }} {{ is_page \"Blog/Post\" }} {{ is_page \"home\" }} {{ assets \"css/site.css\" }}",
        );
    let controller = controller_with(Arc::new(theme));
    let response = controller.run(&CmsRequest::new("/blog/hello", "GET")).unwrap();
    assert_eq!(
        response.html_body(),
        Some("/blog/hello true false /themes/demo/assets/css/site.css")
    );
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_filesystem_theme_end_to_end() {
    let dir = tempdir().unwrap();
    let themes = dir.path().join("themes");
    write(&themes, "site/layouts/default.htm", "<html>{{ page }}</html>");
    write(&themes, "site/pages/home.htm", "[cfg]\nurl = /\n[/cfg]\n<h1>Home</h1>");
    write(&themes, "site/pages/docs.htm", "[cfg]\nurl = /docs/:path*\n[/cfg]\n{{ route.path }}");
    write(&themes, "site/pages/404.htm", "[cfg]\nurl = /404\nlayout = default\n[/cfg]\nmissing");

    let theme = Arc::new(FileSystemTheme::new(&themes, "site"));
    let controller = controller_with(theme);

    let response = controller.handle(&CmsRequest::new("/", "GET"));
    assert_eq!(response.html_body(), Some("<html><h1>Home</h1></html>"));

    let response = controller.handle(&CmsRequest::new("/docs/a/b/c", "GET"));
    assert_eq!(response.html_body(), Some("<html>/a/b/c</html>"));

    let response = controller.handle(&CmsRequest::new("/nothing/here", "GET"));
    assert_eq!(response.status(), 404);
    assert_eq!(response.html_body(), Some("<html>missing</html>"));

    // A page deleted after routing triggers one reload, then not found.
    fs::remove_file(themes.join("site/pages/home.htm")).unwrap();
    let response = controller.handle(&CmsRequest::new("/", "GET"));
    assert_eq!(response.status(), 404);
}
