// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTML page templates (Tera).

use crate::error::AppError;
use tera::{Context, Tera};

pub const INDEX_TEMPLATE: &str = "index.html";
pub const SITE_TEMPLATE: &str = "site.html";
pub const SEARCH_TEMPLATE: &str = "pa.html";

/// Renders the index, site and search pages.
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Templates compiled into the binary.
    pub fn builtin() -> Result<Self, AppError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (INDEX_TEMPLATE, include_str!("../templates/index.html")),
            (SITE_TEMPLATE, include_str!("../templates/site.html")),
            (SEARCH_TEMPLATE, include_str!("../templates/pa.html")),
        ])
        .map_err(template_error)?;
        Ok(Self { tera })
    }

    /// Load every `*.html` template under `dir`.
    pub fn from_dir(dir: &str) -> Result<Self, AppError> {
        let pattern = format!("{}/**/*.html", dir.trim_end_matches('/'));
        let tera = Tera::new(&pattern).map_err(template_error)?;
        tracing::info!(
            dir,
            count = tera.get_template_names().count(),
            "Loaded templates"
        );
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String, AppError> {
        self.tera.render(name, context).map_err(template_error)
    }
}

/// Flatten Tera's error chain; the top-level message alone is rarely useful.
fn template_error(err: tera::Error) -> AppError {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    AppError::Template(message)
}
