//! Mount points for rendered cards.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{DisplayError, render::DisplayNode};

/// Class of the container every card is placed in.
pub const GRID_CLASS: &str = "weather-grid";

/// The area cards are rendered into. Each refresh clears it and appends one node per city.
pub trait DisplayArea: Send {
    fn clear(&mut self) -> Result<(), DisplayError>;
    fn append(&mut self, node: DisplayNode) -> Result<(), DisplayError>;
    fn nodes(&self) -> &[DisplayNode];
}

/// In-memory grid.
#[derive(Debug, Default, Clone)]
pub struct Grid {
    nodes: Vec<DisplayNode>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl DisplayArea for Grid {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.nodes.clear();
        Ok(())
    }

    fn append(&mut self, node: DisplayNode) -> Result<(), DisplayError> {
        self.nodes.push(node);
        Ok(())
    }

    fn nodes(&self) -> &[DisplayNode] {
        &self.nodes
    }
}

/// Render a complete document holding `nodes` inside the grid container.
pub fn render_page(nodes: &[DisplayNode]) -> String {
    let cards: String = nodes.iter().map(|n| n.to_html()).collect::<Vec<_>>().join("\n");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Weather</title>
  <link rel="stylesheet" href="style.css">
</head>
<body>
<div class="{GRID_CLASS}">
{cards}
</div>
</body>
</html>
"#
    )
}

/// A grid mirrored to an HTML file, rewritten on every change.
#[derive(Debug)]
pub struct HtmlPage {
    path: PathBuf,
    grid: Grid,
}

impl HtmlPage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), grid: Grid::new() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), DisplayError> {
        fs::write(&self.path, render_page(self.grid.nodes()))
            .map_err(|source| DisplayError::Write { path: self.path.clone(), source })
    }
}

impl DisplayArea for HtmlPage {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.grid.clear()?;
        self.flush()
    }

    fn append(&mut self, node: DisplayNode) -> Result<(), DisplayError> {
        self.grid.append(node)?;
        self.flush()
    }

    fn nodes(&self) -> &[DisplayNode] {
        self.grid.nodes()
    }
}
