//! # Preamble Module
//!
//! Finds the leading lines that must stay at the very top of a file: an
//! interpreter directive, XML/HTML declarations, a front-matter fence, or the
//! root tag of a single-file component. The header is inserted after them.

use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::FileClassification;

/// Line prefixes (compared lowercase, after left-stripping) that open a
/// markup document and must precede the header.
const DECLARATION_PREFIXES: &[&str] = &["<?xml", "<!doctype", "<?php", "<%", "<script setup", "<template"];

/// Front-matter fence used by Astro components and static-site generators.
const FRONT_MATTER_FENCE: &str = "---";

/// PEP 263 style encoding declaration.
static ENCODING_DECLARATION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[ \t\f]*#.*?coding[:=][ \t]*[-\w.]+").expect("encoding regex must compile"));

/// Structural shape of a file, selecting the preamble rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileShape {
  /// Ordinary source file.
  Plain,
  /// Starts with a `#!` interpreter directive.
  Shebang,
  /// Markup or server-side template with leading declarations.
  XmlLike,
  /// Vue, Svelte or Astro component.
  MultiSectionFramework,
}

impl FileShape {
  /// Derives the shape from the file's first line and its classification.
  pub fn detect(lines: &[&str], classification: &FileClassification) -> Self {
    if lines.first().is_some_and(|line| line.starts_with("#!")) {
      Self::Shebang
    } else if classification.is_multi_section_framework {
      Self::MultiSectionFramework
    } else if classification.is_structural_xml_like {
      Self::XmlLike
    } else {
      Self::Plain
    }
  }
}

/// Splits `lines` into the preamble and the remaining body.
///
/// The preamble is always a strictly leading run: a declaration-looking line
/// further down the file is never consumed.
pub fn extract_preamble<'l, 'a>(
  lines: &'l [&'a str],
  classification: &FileClassification,
) -> (&'l [&'a str], &'l [&'a str]) {
  let shape = FileShape::detect(lines, classification);
  let len = preamble_len(lines, shape, classification);
  lines.split_at(len)
}

fn preamble_len(lines: &[&str], shape: FileShape, classification: &FileClassification) -> usize {
  match shape {
    // An encoding declaration must stay on line 1 or 2
    FileShape::Shebang if classification.is_structural_xml_like => {
      1 + lines[1..].iter().take_while(|line| is_declaration(line)).count()
    }
    FileShape::Shebang => 1 + usize::from(has_encoding_declaration(lines, 1, classification)),
    FileShape::Plain => usize::from(has_encoding_declaration(lines, 0, classification)),
    FileShape::XmlLike | FileShape::MultiSectionFramework => {
      front_matter_len(lines).unwrap_or_else(|| lines.iter().take_while(|line| is_declaration(line)).count())
    }
  }
}

fn has_encoding_declaration(lines: &[&str], index: usize, classification: &FileClassification) -> bool {
  classification.dialect.start == "#" && lines.get(index).is_some_and(|line| ENCODING_DECLARATION.is_match(line))
}

/// Length of a closed front-matter block at the top of the file, fences
/// included.
fn front_matter_len(lines: &[&str]) -> Option<usize> {
  if lines.first()?.trim_end() != FRONT_MATTER_FENCE {
    return None;
  }
  lines
    .iter()
    .skip(1)
    .position(|line| line.trim_end() == FRONT_MATTER_FENCE)
    .map(|closing| closing + 2)
}

fn is_declaration(line: &str) -> bool {
  let line = line.trim_start().to_lowercase();
  DECLARATION_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dialect::DialectRegistry;

  fn classify(name: &str) -> FileClassification {
    DialectRegistry::new().classify(name, None).expect("supported file type")
  }

  fn split<'l, 'a>(lines: &'l [&'a str], name: &str) -> (&'l [&'a str], &'l [&'a str]) {
    extract_preamble(lines, &classify(name))
  }

  #[test]
  fn test_shebang_is_always_preamble() {
    let lines = ["#!/usr/bin/env node", "console.log('hi');"];
    let (preamble, body) = split(&lines, "cli.js");
    assert_eq!(preamble, &["#!/usr/bin/env node"]);
    assert_eq!(body, &["console.log('hi');"]);
    assert_eq!(FileShape::detect(&lines, &classify("cli.js")), FileShape::Shebang);
  }

  #[test]
  fn test_shebang_then_encoding_declaration() {
    let lines = ["#!/usr/bin/env python3", "# -*- coding: latin-1 -*-", "x = 1"];
    let (preamble, body) = split(&lines, "tool.py");
    assert_eq!(preamble.len(), 2);
    assert_eq!(body, &["x = 1"]);
  }

  #[test]
  fn test_shebang_then_php_open_tag() {
    let lines = ["#!/usr/bin/env php", "<?php", "echo 'hi';"];
    let (preamble, body) = split(&lines, "bin/tool.php");
    assert_eq!(preamble, &["#!/usr/bin/env php", "<?php"]);
    assert_eq!(body, &["echo 'hi';"]);
  }

  #[test]
  fn test_plain_file_has_no_preamble() {
    let lines = ["import os", "print(os.name)"];
    let (preamble, body) = split(&lines, "main.py");
    assert!(preamble.is_empty());
    assert_eq!(body.len(), 2);
  }

  #[test]
  fn test_empty_file() {
    let lines: [&str; 0] = [];
    let (preamble, body) = split(&lines, "empty.py");
    assert!(preamble.is_empty());
    assert!(body.is_empty());
  }

  #[test]
  fn test_encoding_declaration_stays_first() {
    let lines = ["# -*- coding: utf-8 -*-", "x = 1"];
    let (preamble, _) = split(&lines, "legacy.py");
    assert_eq!(preamble, &["# -*- coding: utf-8 -*-"]);

    let lines = ["# just a comment", "x = 1"];
    let (preamble, _) = split(&lines, "legacy.py");
    assert!(preamble.is_empty());
  }

  #[test]
  fn test_xml_declarations() {
    let lines = [
      "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
      "<!DOCTYPE note SYSTEM \"note.dtd\">",
      "<note>",
      "</note>",
    ];
    let (preamble, body) = split(&lines, "note.xml");
    assert_eq!(preamble.len(), 2);
    assert_eq!(body, &["<note>", "</note>"]);
  }

  #[test]
  fn test_doctype_is_case_insensitive() {
    let lines = ["<!doctype html>", "<html>", "</html>"];
    let (preamble, _) = split(&lines, "index.html");
    assert_eq!(preamble, &["<!doctype html>"]);
  }

  #[test]
  fn test_php_open_tag() {
    let lines = ["<?php", "echo 'hi';"];
    let (preamble, body) = split(&lines, "index.php");
    assert_eq!(preamble, &["<?php"]);
    assert_eq!(body, &["echo 'hi';"]);
  }

  #[test]
  fn test_declaration_mid_file_is_not_preamble() {
    let lines = ["<div>", "<?xml version=\"1.0\"?>"];
    let (preamble, body) = split(&lines, "fragment.html");
    assert!(preamble.is_empty());
    assert_eq!(body.len(), 2);
  }

  #[test]
  fn test_vue_template_root() {
    let lines = ["<template>", "  <div>{{ msg }}</div>", "</template>"];
    let (preamble, body) = split(&lines, "App.vue");
    assert_eq!(preamble, &["<template>"]);
    assert_eq!(body[0], "  <div>{{ msg }}</div>");
  }

  #[test]
  fn test_svelte_script_is_not_preamble() {
    let lines = ["<script>", "  let count = 0;", "</script>"];
    let (preamble, _) = split(&lines, "Counter.svelte");
    assert!(preamble.is_empty());
  }

  #[test]
  fn test_astro_front_matter() {
    let lines = ["---", "const title = 'Home';", "---", "<h1>{title}</h1>"];
    let (preamble, body) = split(&lines, "index.astro");
    assert_eq!(preamble.len(), 3);
    assert_eq!(body, &["<h1>{title}</h1>"]);
  }

  #[test]
  fn test_unclosed_front_matter_is_not_preamble() {
    let lines = ["---", "const title = 'Home';", "<h1>{title}</h1>"];
    let (preamble, _) = split(&lines, "index.astro");
    assert!(preamble.is_empty());
  }

  #[test]
  fn test_front_matter_only_for_markup() {
    let lines = ["---", "key: value", "---"];
    let (preamble, _) = split(&lines, "config.yaml");
    assert!(preamble.is_empty());
  }
}
