use std::fmt;

use products_crm::stage;
use products_crm::{Board, Highlight, StageChange};
use rust_decimal::{Decimal, RoundingStrategy};

/// `$12,500`, `$1,200.5`; cents are rounded half away from zero.
pub fn money(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}${grouped}.{fraction}"),
        None => format!("{sign}${grouped}"),
    }
}

/// Stage registry as a table, one stage per line.
pub struct StageTable;

impl fmt::Display for StageTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in stage::all() {
            let flag = if stage.is_won {
                "  won"
            } else if stage.is_lost {
                "  lost"
            } else {
                ""
            };
            writeln!(
                f,
                "{:<2} {:<12} {:<14} {:>3}%{flag}",
                stage.ordinal, stage.id, stage.label, stage.default_probability
            )?;
        }
        Ok(())
    }
}

/// Summary header followed by one block per column.
pub struct BoardView<'b, 'a> {
    pub board: &'b Board<'a>,
    pub highlight: Highlight,
}

impl fmt::Display for BoardView<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.board.summary;
        writeln!(
            f,
            "Total Pipeline     {:>14}  ({} active deals)",
            money(summary.total_value),
            summary.deal_count
        )?;
        writeln!(f, "Weighted Pipeline  {:>14}", money(summary.weighted_value))?;
        writeln!(f, "Avg. Deal Size     {:>14}", money(summary.average_deal_size))?;

        for column in &self.board.columns {
            let marker = if self.highlight.is_drop_target(column.stage.id) {
                ">"
            } else {
                " "
            };
            writeln!(
                f,
                "\n{marker} {} ({})  {}",
                column.stage.label,
                column.count,
                money(column.subtotal)
            )?;
            if column.deals.is_empty() {
                writeln!(f, "    (no deals in this stage)")?;
            }
            for deal in &column.deals {
                let dragging = if self.highlight.is_drag_source(deal.id) {
                    "~"
                } else {
                    " "
                };
                writeln!(
                    f,
                    "  {dragging} #{} {} | {} | {} | {}%",
                    deal.id,
                    deal.title,
                    deal.company,
                    money(deal.value),
                    deal.probability
                )?;
            }
        }
        Ok(())
    }
}

/// Stage-change log, oldest first.
pub struct History<'a>(pub &'a [StageChange]);

impl fmt::Display for History<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for change in self.0 {
            writeln!(
                f,
                "#{} {} -> {} ({}%) at {}",
                change.deal_id,
                change.from,
                change.to,
                change.probability,
                change.changed_at.format("%Y-%m-%d %H:%M:%S")
            )?;
        }
        Ok(())
    }
}
