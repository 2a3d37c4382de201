//! Content-to-blocks renderer.
//!
//! Handles a small markdown subset line by line: `#`/`##`/`###` headings,
//! `---` rules, pipe tables, `- `/`• ` bullets, paragraphs and `**bold**` spans.
//! Anything else is paragraph text.

use crate::domain::{ChannelPlan, DisplayBlock, Span, StrategyPlan, StrategyResult};

const BOLD_MARKER: &str = "**";

/// Split `text` into plain and bold spans. Unbalanced markers stay literal.
pub fn split_bold_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(BOLD_MARKER) {
        let after_open = &rest[open + BOLD_MARKER.len()..];
        let Some(close) = after_open.find(BOLD_MARKER) else {
            break;
        };
        if open > 0 {
            spans.push(Span::plain(&rest[..open]));
        }
        if close > 0 {
            spans.push(Span::bold(&after_open[..close]));
        }
        rest = &after_open[close + BOLD_MARKER.len()..];
    }

    if !rest.is_empty() {
        spans.push(Span::plain(rest));
    }
    spans
}

#[derive(Default)]
struct TableBuffer {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Line-driven renderer state.
#[derive(Default)]
struct BlockRenderer {
    paragraph: Vec<String>,
    list: Vec<Vec<Span>>,
    table: Option<TableBuffer>,
    blocks: Vec<DisplayBlock>,
}

impl BlockRenderer {
    fn push_line(&mut self, line: &str) {
        let trimmed = line.trim();

        if let Some((level, text)) = heading(line) {
            self.flush_paragraph();
            self.flush_table();
            self.flush_list();
            self.blocks.push(DisplayBlock::heading(level, text.trim()));
        } else if trimmed == "---" {
            self.flush_all();
            self.blocks.push(DisplayBlock::Rule);
        } else if line.contains('|') && line.split('|').count() > 2 {
            // Table rows keep the table buffer open across lines.
            self.flush_paragraph();
            self.flush_list();
            self.push_table_row(line);
        } else if let Some(item) = bullet(trimmed) {
            self.flush_paragraph();
            self.flush_table();
            self.list.push(split_bold_spans(item));
        } else if !trimmed.is_empty() {
            self.flush_table();
            self.flush_list();
            self.paragraph.push(trimmed.to_string());
        } else {
            self.flush_all();
        }
    }

    fn push_table_row(&mut self, line: &str) {
        let cells: Vec<String> = line
            .split('|')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        match &mut self.table {
            None => {
                self.table = Some(TableBuffer {
                    headers: cells,
                    rows: Vec::new(),
                });
            }
            Some(table) => {
                if !cells.iter().all(|c| is_separator_cell(c)) {
                    table.rows.push(cells);
                }
            }
        }
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.paragraph).join(" ");
        self.blocks.push(DisplayBlock::Paragraph {
            spans: split_bold_spans(&text),
        });
    }

    fn flush_table(&mut self) {
        if let Some(table) = self.table.take() {
            if !table.headers.is_empty() && !table.rows.is_empty() {
                self.blocks.push(DisplayBlock::Table {
                    headers: table.headers,
                    rows: table.rows,
                });
            }
        }
    }

    fn flush_list(&mut self) {
        if self.list.is_empty() {
            return;
        }
        self.blocks.push(DisplayBlock::BulletList {
            items: std::mem::take(&mut self.list),
        });
    }

    fn flush_all(&mut self) {
        self.flush_paragraph();
        self.flush_table();
        self.flush_list();
    }

    fn finish(mut self) -> Vec<DisplayBlock> {
        self.flush_all();
        self.blocks
    }
}

fn heading(line: &str) -> Option<(u8, &str)> {
    [("### ", 3), ("## ", 2), ("# ", 1)]
        .into_iter()
        .find_map(|(prefix, level)| line.strip_prefix(prefix).map(|text| (level, text)))
}

fn bullet(trimmed: &str) -> Option<&str> {
    trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("• "))
}

fn is_separator_cell(cell: &str) -> bool {
    !cell.is_empty() && cell.chars().all(|c| c == '-' || c == ':')
}

/// Render markdown-subset content into display blocks.
pub fn render_content(content: &str) -> Vec<DisplayBlock> {
    let mut renderer = BlockRenderer::default();
    for line in content.lines() {
        renderer.push_line(line);
    }
    renderer.finish()
}

/// Render either strategy shape.
pub fn render_strategy(result: &StrategyResult) -> Vec<DisplayBlock> {
    match result {
        StrategyResult::Content { content } => render_content(content),
        StrategyResult::Structured(plan) => render_plan(plan),
    }
}

fn paragraph(text: &str) -> DisplayBlock {
    DisplayBlock::Paragraph {
        spans: split_bold_spans(text.trim()),
    }
}

fn render_plan(plan: &StrategyPlan) -> Vec<DisplayBlock> {
    let mut blocks = Vec::new();

    if let Some(analysis) = &plan.website_analysis {
        blocks.push(DisplayBlock::heading(1, "Website & Goal Analysis"));
        blocks.extend(render_content(analysis));
    }
    if let Some(approach) = plan.strategic_approach.as_ref().or(plan.overall_strategy.as_ref()) {
        blocks.push(DisplayBlock::heading(2, "Strategic Approach"));
        blocks.extend(render_content(approach));
    }

    if !plan.channels.is_empty() {
        blocks.push(DisplayBlock::heading(2, "Budget Allocation"));
        blocks.push(DisplayBlock::Table {
            headers: vec!["Platform".into(), "Budget".into(), "Percentage".into()],
            rows: plan.channels.iter().map(allocation_row).collect(),
        });
        for channel in &plan.channels {
            blocks.push(DisplayBlock::Rule);
            blocks.extend(render_channel(channel));
        }
    }

    if let Some(totals) = &plan.total_predicted_results {
        blocks.push(DisplayBlock::Rule);
        blocks.push(DisplayBlock::heading(2, "Total Predicted Results"));
        let items: Vec<Vec<Span>> = [
            ("Total Clicks", &totals.total_clicks),
            ("Total Conversions", &totals.total_conversions),
            ("Blended CPA", &totals.blended_cpa),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| metric_item(label, &v.to_string())))
        .collect();
        if !items.is_empty() {
            blocks.push(DisplayBlock::BulletList { items });
        }
        if let Some(summary) = &totals.summary {
            blocks.push(paragraph(summary));
        }
    }

    if let Some(expected) = &plan.expected_results {
        blocks.push(DisplayBlock::heading(2, "Projected Results"));
        let mut items = Vec::new();
        if let Some(revenue) = expected.projected_revenue {
            items.push(metric_item("Projected Revenue", &format!("${:.0}", revenue)));
        }
        if let Some(roas) = expected.projected_roas {
            items.push(metric_item("Expected ROAS", &format!("{:.2}x", roas)));
        }
        if let Some(timeframe) = &expected.timeframe {
            items.push(metric_item("Timeframe", timeframe));
        }
        if !items.is_empty() {
            blocks.push(DisplayBlock::BulletList { items });
        }
    }

    blocks
}

fn allocation_row(channel: &ChannelPlan) -> Vec<String> {
    vec![
        channel.name.clone(),
        format!("${:.2}", channel.allocation),
        channel
            .percentage
            .map(|p| format!("{:.0}%", p))
            .unwrap_or_else(|| "-".to_string()),
    ]
}

fn render_channel(channel: &ChannelPlan) -> Vec<DisplayBlock> {
    let mut blocks = vec![DisplayBlock::heading(
        3,
        format!("{} (${:.2})", channel.name, channel.allocation),
    )];
    if let Some(narrative) = channel.narrative() {
        blocks.push(paragraph(narrative));
    }

    let mut items: Vec<Vec<Span>> = channel
        .predicted_metrics
        .as_ref()
        .map(|m| {
            m.entries()
                .into_iter()
                .map(|(label, value)| metric_item(label, &value.to_string()))
                .collect()
        })
        .unwrap_or_default();
    if let Some(roas) = channel.expected_roas {
        items.push(metric_item("Expected ROAS", &format!("{:.2}x", roas)));
    }
    if !items.is_empty() {
        blocks.push(DisplayBlock::BulletList { items });
    }
    blocks
}

fn metric_item(label: &str, value: &str) -> Vec<Span> {
    vec![Span::bold(format!("{}:", label)), Span::plain(format!(" {}", value))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetricValue, PredictedMetrics, TotalPredictedResults};

    #[test]
    fn bold_split() {
        assert_eq!(
            split_bold_spans("a **b** c"),
            vec![Span::plain("a "), Span::bold("b"), Span::plain(" c")]
        );
    }

    #[test]
    fn unbalanced_bold_stays_plain() {
        assert_eq!(split_bold_spans("a **b c"), vec![Span::plain("a **b c")]);
        assert_eq!(
            split_bold_spans("**x** and **y"),
            vec![Span::bold("x"), Span::plain(" and **y")]
        );
        assert_eq!(split_bold_spans("***"), vec![Span::plain("***")]);
    }

    #[test]
    fn end_to_end_document() {
        let input = [
            "# Title",
            "",
            "Some **bold** text.",
            "",
            "- item one",
            "- item two",
            "",
            "| H1 | H2 |",
            "|---|---|",
            "| a | b |",
        ]
        .join("\n");

        assert_eq!(
            render_content(&input),
            vec![
                DisplayBlock::heading(1, "Title"),
                DisplayBlock::Paragraph {
                    spans: vec![Span::plain("Some "), Span::bold("bold"), Span::plain(" text.")]
                },
                DisplayBlock::BulletList {
                    items: vec![vec![Span::plain("item one")], vec![Span::plain("item two")]]
                },
                DisplayBlock::Table {
                    headers: vec!["H1".into(), "H2".into()],
                    rows: vec![vec!["a".into(), "b".into()]],
                },
            ]
        );
    }

    #[test]
    fn paragraphs_join_lines_with_single_space() {
        let blocks = render_content("one\ntwo\n\nthree\n  four  \n\n\nfive");
        assert_eq!(
            blocks,
            vec![
                DisplayBlock::Paragraph {
                    spans: vec![Span::plain("one two")]
                },
                DisplayBlock::Paragraph {
                    spans: vec![Span::plain("three four")]
                },
                DisplayBlock::Paragraph {
                    spans: vec![Span::plain("five")]
                },
            ]
        );
    }

    #[test]
    fn header_only_table_emits_nothing() {
        assert!(render_content("| A | B |\n|---|:--:|\n\n").is_empty());
        assert_eq!(render_content("| A | B |\nafter"), vec![DisplayBlock::Paragraph {
            spans: vec![Span::plain("after")]
        }]);
    }

    #[test]
    fn heading_levels_and_rules_flush_buffers() {
        let blocks = render_content("intro\n## Two\n- x\n### Three\n---\n• y");
        assert_eq!(
            blocks,
            vec![
                DisplayBlock::Paragraph {
                    spans: vec![Span::plain("intro")]
                },
                DisplayBlock::heading(2, "Two"),
                DisplayBlock::BulletList {
                    items: vec![vec![Span::plain("x")]]
                },
                DisplayBlock::heading(3, "Three"),
                DisplayBlock::Rule,
                DisplayBlock::BulletList {
                    items: vec![vec![Span::plain("y")]]
                },
            ]
        );
    }

    #[test]
    fn paragraph_line_ends_a_list_and_list_ends_a_paragraph() {
        let blocks = render_content("- **Keywords:** seo\nfollow-up text\n- next");
        assert_eq!(
            blocks,
            vec![
                DisplayBlock::BulletList {
                    items: vec![vec![Span::bold("Keywords:"), Span::plain(" seo")]]
                },
                DisplayBlock::Paragraph {
                    spans: vec![Span::plain("follow-up text")]
                },
                DisplayBlock::BulletList {
                    items: vec![vec![Span::plain("next")]]
                },
            ]
        );
    }

    #[test]
    fn two_segment_pipe_line_is_paragraph_text() {
        assert_eq!(
            render_content("a | b"),
            vec![DisplayBlock::Paragraph {
                spans: vec![Span::plain("a | b")]
            }]
        );
    }

    #[test]
    fn structured_plan_renders_allocation_and_totals() {
        let plan = StrategyPlan {
            website_analysis: Some("Sells **shoes**.".into()),
            channels: vec![ChannelPlan {
                name: "Meta".into(),
                allocation: 300.0,
                percentage: Some(60.0),
                strategy: Some("Carousel ads".into()),
                predicted_metrics: Some(PredictedMetrics {
                    clicks: Some(MetricValue::Text("400 - 500".into())),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            total_predicted_results: Some(TotalPredictedResults {
                total_clicks: Some(MetricValue::Number(450.0)),
                summary: Some("Solid start".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let blocks = render_strategy(&StrategyResult::Structured(plan));
        assert_eq!(blocks[0], DisplayBlock::heading(1, "Website & Goal Analysis"));
        assert!(blocks.contains(&DisplayBlock::Table {
            headers: vec!["Platform".into(), "Budget".into(), "Percentage".into()],
            rows: vec![vec!["Meta".into(), "$300.00".into(), "60%".into()]],
        }));
        assert!(blocks.contains(&DisplayBlock::heading(3, "Meta ($300.00)")));
        assert!(blocks.contains(&DisplayBlock::BulletList {
            items: vec![vec![Span::bold("Clicks:"), Span::plain(" 400 - 500")]]
        }));
        assert!(blocks.contains(&DisplayBlock::BulletList {
            items: vec![vec![Span::bold("Total Clicks:"), Span::plain(" 450")]]
        }));
    }

    #[test]
    fn content_result_uses_line_renderer() {
        let result = StrategyResult::Content {
            content: "## Budget\n\n| P | B |\n|--|--|\n| X | $1 |".into(),
        };
        assert_eq!(render_strategy(&result).len(), 2);
    }
}
