//! Embedded image discovery.
//!
//! Raw `<img src="..." />` tags in chapter bodies are rewritten to local
//! `<image l:href="#id"/>` anchors, and every distinct source reference is
//! collected once, in document order, with an id no other reference shares.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::models::{ChapterNode, Illustration};

static RE_IMG: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<img\s+src="([^"]+)"\s*/>"#).unwrap());

/// Base picture id for a source reference.
///
/// `/i/book/5/1.jpg` becomes `i_book_5_1.jpg`. Distinct references may map
/// to the same base id; [`extract_illustrations`] suffixes the later ones.
pub fn picture_id(reference: &str) -> String {
    let path = reference
        .split_once("://")
        .map(|(_, rest)| rest.split_once('/').map_or("", |(_, path)| path))
        .unwrap_or(reference);

    path.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect::<String>()
        .trim_start_matches('_')
        .to_string()
}

/// Rewrites image tags in `content`, naming each anchor with `id_of`.
/// Returns the new text and the references found, in order of appearance
/// (repeats included).
pub fn rewrite_images(content: &str, mut id_of: impl FnMut(&str) -> String) -> (String, Vec<String>) {
    let mut references = Vec::new();
    let rewritten = RE_IMG.replace_all(content, |caps: &Captures<'_>| {
        let reference = caps[1].to_string();
        let anchor = format!("<image l:href=\"#{}\"/>", id_of(&reference));
        references.push(reference);
        anchor
    });
    (rewritten.into_owned(), references)
}

/// Walks the tree depth-first, rewriting every body and allocating one
/// picture per distinct reference. The cover goes last unless a chapter
/// already uses it.
pub fn extract_illustrations(chapters: Vec<ChapterNode>, cover: Option<&str>) -> (Vec<ChapterNode>, Vec<Illustration>) {
    let mut ids = PictureIds::default();

    let chapters = chapters.into_iter().map(|node| rewrite_node(node, &mut ids)).collect();

    if let Some(cover) = cover {
        ids.allocate(cover);
    }

    (chapters, ids.allocated)
}

fn rewrite_node(mut node: ChapterNode, ids: &mut PictureIds) -> ChapterNode {
    if let Some(content) = node.content.take() {
        let (content, found) = rewrite_images(&content, |reference| ids.allocate(reference));
        if !found.is_empty() {
            debug!("{}: {} images", node.name, found.len());
        }
        node.content = Some(content);
    }

    node.children = std::mem::take(&mut node.children)
        .into_iter()
        .map(|child| rewrite_node(child, ids))
        .collect();
    node
}

/// Keyed on the reference itself, so only identical references share a picture.
#[derive(Default)]
struct PictureIds {
    allocated: Vec<Illustration>,
    by_reference: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl PictureIds {
    fn allocate(&mut self, reference: &str) -> String {
        if let Some(&slot) = self.by_reference.get(reference) {
            return self.allocated[slot].id.clone();
        }

        let id = disambiguate(picture_id(reference), &self.taken);
        self.taken.insert(id.clone());
        self.by_reference.insert(reference.to_string(), self.allocated.len());
        self.allocated.push(Illustration {
            reference: reference.to_string(),
            id: id.clone(),
        });
        id
    }
}

/// `i_x.jpg` -> `i_x_2.jpg`, `i_x_3.jpg`, ... until free.
fn disambiguate(id: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&id) {
        return id;
    }

    let (stem, ext) = match id.rfind('.') {
        Some(dot) if dot > 0 => id.split_at(dot),
        _ => (id.as_str(), ""),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{stem}_{n}{ext}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
