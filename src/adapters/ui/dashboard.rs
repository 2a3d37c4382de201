//! Terminal dashboard: draws display blocks and channel allocation bars.
//!
//! Writers are generic so the same code draws to stdout and to a buffer in tests.

use crate::domain::{DisplayBlock, Span, StrategyPlan, StrategyRequest, StrategyResult};
use crate::usecases::render_strategy;
use chrono::{DateTime, Local};
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use std::io::{self, Write};

/// Width of a full (100%) allocation bar, in cells.
const BAR_WIDTH: usize = 30;

/// Result of the latest submission, as the dashboard shows it.
///
/// Replaced wholesale on every new submission; nothing outlives the session.
#[derive(Debug, Default)]
pub struct DashboardSession {
    request: Option<StrategyRequest>,
    strategy: Option<StrategyResult>,
    blocks: Vec<DisplayBlock>,
    generated_at: Option<DateTime<Local>>,
}

impl DashboardSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh result and render its blocks.
    pub fn replace(&mut self, request: StrategyRequest, strategy: StrategyResult) {
        self.blocks = render_strategy(&strategy);
        self.request = Some(request);
        self.strategy = Some(strategy);
        self.generated_at = Some(Local::now());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn request(&self) -> Option<&StrategyRequest> {
        self.request.as_ref()
    }

    pub fn strategy(&self) -> Option<&StrategyResult> {
        self.strategy.as_ref()
    }

    pub fn blocks(&self) -> &[DisplayBlock] {
        &self.blocks
    }

    pub fn has_strategy(&self) -> bool {
        self.strategy.is_some()
    }

    /// Draw the whole session: header line, allocation bars (structured plans), blocks.
    pub fn draw<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let Some(strategy) = &self.strategy else {
            return Ok(());
        };
        if let (Some(request), Some(at)) = (&self.request, &self.generated_at) {
            queue!(
                out,
                SetForegroundColor(Color::DarkGrey),
                Print(format!(
                    "{} · ${:.2} · {} · {}\r\n\r\n",
                    request.website_url,
                    request.budget,
                    request.goal,
                    at.format("%Y-%m-%d %H:%M")
                )),
                ResetColor
            )?;
        }
        if let StrategyResult::Structured(plan) = strategy {
            draw_allocation_bars(out, plan)?;
        }
        draw_blocks(out, &self.blocks)?;
        out.flush()
    }
}

/// `█████░░░░░` style bar for `percentage` (clamped to 0..=100).
pub fn percentage_bar(percentage: f64, width: usize) -> String {
    let clamped = if percentage.is_finite() {
        percentage.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled = ((clamped / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// One bar per channel. Channels without a percentage use their share of the allocated total.
pub fn draw_allocation_bars<W: Write>(out: &mut W, plan: &StrategyPlan) -> io::Result<()> {
    if plan.channels.is_empty() {
        return Ok(());
    }
    let total = plan.allocated_total();
    let name_width = plan
        .channels
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0);

    queue!(
        out,
        SetAttribute(Attribute::Bold),
        Print("Budget split\r\n"),
        SetAttribute(Attribute::Reset)
    )?;
    for channel in &plan.channels {
        let pct = channel.percentage.unwrap_or(if total > 0.0 {
            channel.allocation / total * 100.0
        } else {
            0.0
        });
        queue!(
            out,
            Print(format!("  {:<width$}  ", channel.name, width = name_width)),
            SetForegroundColor(Color::Cyan),
            Print(percentage_bar(pct, BAR_WIDTH)),
            ResetColor,
            Print(format!(" {:>3.0}%  ${:.2}\r\n", pct, channel.allocation))
        )?;
    }
    queue!(out, Print("\r\n"))
}

fn heading_color(level: u8) -> Color {
    match level {
        1 => Color::Magenta,
        2 => Color::Cyan,
        _ => Color::Blue,
    }
}

fn draw_spans<W: Write>(out: &mut W, spans: &[Span]) -> io::Result<()> {
    for span in spans {
        if span.bold {
            queue!(
                out,
                SetAttribute(Attribute::Bold),
                Print(&span.text),
                SetAttribute(Attribute::NormalIntensity)
            )?;
        } else {
            queue!(out, Print(&span.text))?;
        }
    }
    Ok(())
}

fn draw_table<W: Write>(out: &mut W, headers: &[String], rows: &[Vec<String>]) -> io::Result<()> {
    let columns = headers
        .len()
        .max(rows.iter().map(Vec::len).max().unwrap_or(0));
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let line = |cells: &[String]| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!(" {:<width$} ", cell, width = *w)
            })
            .collect::<Vec<_>>()
            .join("│")
    };
    let separator = widths
        .iter()
        .map(|w| "─".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("┼");

    queue!(
        out,
        SetAttribute(Attribute::Bold),
        Print(line(headers)),
        SetAttribute(Attribute::Reset),
        Print("\r\n"),
        SetForegroundColor(Color::DarkGrey),
        Print(separator),
        ResetColor,
        Print("\r\n")
    )?;
    for row in rows {
        queue!(out, Print(line(row)), Print("\r\n"))?;
    }
    Ok(())
}

/// Draw blocks in order, one blank line between blocks.
pub fn draw_blocks<W: Write>(out: &mut W, blocks: &[DisplayBlock]) -> io::Result<()> {
    for block in blocks {
        match block {
            DisplayBlock::Heading { level, text } => {
                let marker = if *level == 1 { "▌ " } else { "" };
                queue!(
                    out,
                    SetForegroundColor(heading_color(*level)),
                    SetAttribute(Attribute::Bold),
                    Print(format!("{}{}", marker, text)),
                    SetAttribute(Attribute::Reset),
                    ResetColor,
                    Print("\r\n")
                )?;
            }
            DisplayBlock::Paragraph { spans } => {
                draw_spans(out, spans)?;
                queue!(out, Print("\r\n"))?;
            }
            DisplayBlock::BulletList { items } => {
                for item in items {
                    queue!(out, SetForegroundColor(Color::Cyan), Print("  • "), ResetColor)?;
                    draw_spans(out, item)?;
                    queue!(out, Print("\r\n"))?;
                }
            }
            DisplayBlock::Table { headers, rows } => draw_table(out, headers, rows)?,
            DisplayBlock::Rule => {
                queue!(
                    out,
                    SetForegroundColor(Color::DarkGrey),
                    Print("─".repeat(60)),
                    ResetColor,
                    Print("\r\n")
                )?;
            }
        }
        queue!(out, Print("\r\n"))?;
    }
    Ok(())
}
