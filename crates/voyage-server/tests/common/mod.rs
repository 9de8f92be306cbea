//! A small on-disk site shared by the pipeline tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use http::{Request, Response};
use voyage_core::{RenderContext, RenderError, SiteConfig};
use voyage_modules::{module_page, ModuleProvider};
use voyage_render::Site;
use voyage_router::{RouteTable, RouteTableError};
use voyage_view::{factory, Component, Node};

pub const SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <link rel="stylesheet" href="/public/styles.css">
  <!--ssr-head-->
</head>
<body>
  <div id="app"><!--ssr-outlet--></div>
</body>
</html>
"#;

pub const HOME_PAGE: &str = r#"---
title = "Voyage | Home"
description = "Hand-picked trips"
data = "home"
---
<main class="home">
  <h1>{{ props.headline }}</h1>
  <ul>
    {{#each props.featured as trip}}
      <li><a href="/trips/{{ trip.id }}">{{ trip.name }}</a></li>
    {{/each}}
  </ul>
</main>
"#;

pub const HOME_DATA: &str = r#"{
  "headline": "Where next?",
  "featured": [
    { "id": "lisbon", "name": "Lisbon" },
    { "id": "kyoto", "name": "Kyoto" }
  ]
}
"#;

pub const NOT_FOUND_PAGE: &str = r#"---
title = "Not found"
---
<section class="not-found" data-marker="catch-all">
  <h1>Nothing at {{ url.path }}</h1>
</section>
"#;

/// Fails on its sixth line: the prop does not exist.
pub const BROKEN_PAGE: &str = r#"---
title = "Trip planner"
---
<section>
  <h1>Trip planner</h1>
  <p>{{ props.itinerary.first_stop }}</p>
</section>
"#;

/// A native component: renders a trip by id.
pub struct TripPage;

impl Component for TripPage {
    fn name(&self) -> &str {
        "trip"
    }

    fn render(&self, ctx: &RenderContext) -> Result<Node, RenderError> {
        let id = ctx
            .param("id")
            .ok_or_else(|| RenderError::component("trip", "missing `id` parameter"))?;
        Ok(Node::element("article")
            .attr("data-trip", id)
            .child(Node::text(format!("Trip {}", id))))
    }
}

/// The fixture site. `extra_route` changes the route table fingerprint.
#[derive(Default)]
pub struct FixtureSite {
    pub extra_route: bool,
}

impl Site for FixtureSite {
    fn name(&self) -> &str {
        "fixture"
    }

    fn routes(&self, modules: Arc<dyn ModuleProvider>) -> Result<RouteTable, RouteTableError> {
        let mut builder = RouteTable::builder()
            .route("/", module_page("home", &modules))
            .route("/broken", module_page("broken", &modules))
            .route("/trips/:id", factory(|| TripPage));
        if self.extra_route {
            builder = builder.route("/extra", module_page("home", &modules));
        }
        builder.catch_all(module_page("not-found", &modules)).build()
    }
}

/// Write the fixture site into `root`.
pub fn write_site(root: &Path) {
    fs::create_dir_all(root.join("pages")).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();
    fs::create_dir_all(root.join("public")).unwrap();

    fs::write(root.join("index.html"), SHELL).unwrap();
    fs::write(root.join("pages/home.page"), HOME_PAGE).unwrap();
    fs::write(root.join("pages/not-found.page"), NOT_FOUND_PAGE).unwrap();
    fs::write(root.join("pages/broken.page"), BROKEN_PAGE).unwrap();
    fs::write(root.join("data/home.json"), HOME_DATA).unwrap();
    fs::write(root.join("public/styles.css"), "body { margin: 0; }\n").unwrap();
}

pub fn fixture() -> (tempfile::TempDir, SiteConfig) {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());
    let config = SiteConfig::new(dir.path()).with_name("fixture");
    (dir, config)
}

pub fn get(path: &str) -> Request<()> {
    Request::get(path).body(()).unwrap()
}

pub fn body(response: &Response<bytes::Bytes>) -> String {
    String::from_utf8(response.body().to_vec()).unwrap()
}
