//! Terminal outline - Print a `MemoryHost` subtree with crossterm styling.
//!
//! Element nodes are cyan, attributes dim, text nodes plain. Output is queued
//! on the writer and flushed once, so any `io::Write` works (stdout, a
//! `Vec<u8>` in tests).

use std::io::Write;

use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};

use super::memory::{MemoryHost, MemoryNode};
use crate::error::Result;
use crate::types::TEXT_VALUE_KEY;

/// Write an indented, colored outline of the subtree under `root`.
pub fn print_outline<W: Write>(out: &mut W, host: &MemoryHost, root: MemoryNode) -> Result<()> {
    let mut nodes = Vec::new();
    host.walk(root, &mut |node, depth| nodes.push((node, depth)));

    for (node, depth) in nodes {
        queue!(out, Print("  ".repeat(depth)))?;

        if host.is_text(node) {
            let text = host
                .attribute(node, TEXT_VALUE_KEY)
                .map(ToString::to_string)
                .unwrap_or_default();
            queue!(out, Print(format!("{text:?}")), Print("\r\n"))?;
            continue;
        }

        queue!(
            out,
            SetForegroundColor(Color::Cyan),
            Print(format!("<{}", host.tag(node).unwrap_or("?"))),
            ResetColor
        )?;
        for (name, value) in host.attributes(node) {
            queue!(
                out,
                SetAttribute(Attribute::Dim),
                Print(format!(" {name}=\"{value}\"")),
                SetAttribute(Attribute::Reset)
            )?;
        }
        queue!(
            out,
            SetForegroundColor(Color::Cyan),
            Print(">"),
            ResetColor,
            Print("\r\n")
        )?;
    }

    out.flush()?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
