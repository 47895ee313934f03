//! Ratatui widgets that draw a [`ViewBoard`] - overview on top, stocks in the middle,
//! businesses and the transaction feed at the bottom

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::shared::presenter::{ViewNode, ViewTarget};
use crate::shared::surface::ViewBoard;
use crate::shared::types::{ChangeClass, Side};

const C_BUY: Color = Color::Rgb(100, 220, 100);
const C_SELL: Color = Color::Rgb(220, 100, 100);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);
const C_GOLD: Color = Color::Rgb(220, 190, 90);

/// Draw the whole dashboard
pub fn render_dashboard(f: &mut Frame, area: Rect, board: &ViewBoard) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // overview + indicators
            Constraint::Min(8),    // stock table
            Constraint::Percentage(40), // businesses + transactions
            Constraint::Length(1), // status bar
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[2]);

    render_overview_panel(f, top[0], board);
    render_indicators_panel(f, top[1], board);
    render_stock_panel(f, rows[1], board);
    render_business_panel(f, bottom[0], board);
    render_transaction_panel(f, bottom[1], board);
    render_status_bar(f, rows[3], board);
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT))
}

/// `LABEL   value` line, value bold
fn field_line<'a>(label: &'a str, value: &'a str) -> Line<'a> {
    let value = if value.is_empty() { "--" } else { value };
    Line::from(vec![
        Span::styled(format!("{:<22}", label), Style::default().fg(C_DIM)),
        Span::styled(
            value,
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn change_color(class: ChangeClass) -> Color {
    match class {
        ChangeClass::Positive => C_BUY,
        ChangeClass::Negative => C_SELL,
        ChangeClass::Neutral => C_DIM,
    }
}

fn render_overview_panel(f: &mut Frame, area: Rect, board: &ViewBoard) {
    let lines = vec![
        field_line("Total Market Cap", board.text(ViewTarget::TotalMarketCap)),
        field_line("Active Stocks", board.text(ViewTarget::ActiveStocks)),
        field_line("Total Volume", board.text(ViewTarget::TotalVolume)),
        field_line("Last Update", board.text(ViewTarget::LastUpdate)),
    ];
    f.render_widget(Paragraph::new(lines).block(panel(" MARKET OVERVIEW ")), area);
}

fn render_indicators_panel(f: &mut Frame, area: Rect, board: &ViewBoard) {
    let lines = vec![
        field_line("GDP Growth", board.text(ViewTarget::GdpGrowth)),
        field_line("Inflation Rate", board.text(ViewTarget::InflationRate)),
        field_line("Consumer Confidence", board.text(ViewTarget::ConsumerConfidence)),
        field_line("Interest Rate", board.text(ViewTarget::InterestRate)),
        field_line("Tax Rate", board.text(ViewTarget::TaxRate)),
    ];
    f.render_widget(
        Paragraph::new(lines).block(panel(" ECONOMIC INDICATORS ")),
        area,
    );
}

fn render_stock_panel(f: &mut Frame, area: Rect, board: &ViewBoard) {
    let header = Row::new(vec![
        "Company", "Sector", "Price", "Change", "Market Cap", "Available", "Owner",
    ])
    .style(Style::default().fg(C_DIM).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = board
        .children(ViewTarget::StockTable)
        .iter()
        .filter_map(|node| match node {
            ViewNode::Row(row) => Some(row),
            _ => None,
        })
        .map(|row| {
            Row::new(vec![
                Cell::from(Span::styled(
                    row.company.as_str(),
                    Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
                )),
                Cell::from(row.sector.as_str()),
                Cell::from(row.price.as_str()),
                Cell::from(Span::styled(
                    row.change.as_str(),
                    Style::default().fg(change_color(row.change_class)),
                )),
                Cell::from(row.market_cap.as_str()),
                Cell::from(row.available_shares.as_str()),
                Cell::from(Span::styled(row.owner.as_str(), Style::default().fg(C_DIM))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(22),
        Constraint::Percentage(12),
        Constraint::Percentage(10),
        Constraint::Percentage(10),
        Constraint::Percentage(14),
        Constraint::Percentage(10),
        Constraint::Percentage(22),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(" STOCKS "));
    f.render_widget(table, area);
}

fn render_business_panel(f: &mut Frame, area: Rect, board: &ViewBoard) {
    let mut lines = Vec::new();

    for node in board.children(ViewTarget::BusinessGrid) {
        let ViewNode::Card(card) = node else { continue };

        lines.push(Line::from(vec![
            Span::styled(format!("{} ", card.badge), Style::default().fg(C_GOLD)),
            Span::styled(
                card.name.as_str(),
                Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", card.sector), Style::default().fg(C_DIM)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("   profit ", Style::default().fg(C_DIM)),
            Span::styled(card.profit.as_str(), Style::default().fg(C_BUY)),
            Span::styled("  staff ", Style::default().fg(C_DIM)),
            Span::raw(card.employees.as_str()),
            Span::styled("  price ", Style::default().fg(C_DIM)),
            Span::raw(card.price.as_str()),
        ]));
        lines.push(Line::from(Span::styled(
            format!("   owner {}", card.owner),
            Style::default().fg(C_DIM),
        )));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled("No businesses", Style::default().fg(C_DIM))));
    }

    f.render_widget(
        Paragraph::new(lines).block(panel(" TOP BUSINESSES ")),
        area,
    );
}

fn render_transaction_panel(f: &mut Frame, area: Rect, board: &ViewBoard) {
    let mut lines = Vec::new();

    for node in board.children(ViewTarget::TransactionList) {
        let ViewNode::Feed(item) = node else { continue };

        let (marker, color) = match item.side {
            Side::Buy => ("▲", C_BUY),
            Side::Sell => ("▼", C_SELL),
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{} ", marker), Style::default().fg(color)),
            Span::styled(
                item.headline.as_str(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", item.value), Style::default().fg(C_BRIGHT)),
            Span::styled(format!("  {}", item.time_ago), Style::default().fg(C_DIM)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", item.details),
            Style::default().fg(C_DIM),
        )));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No transactions yet",
            Style::default().fg(C_DIM),
        )));
    }

    f.render_widget(
        Paragraph::new(lines)
            .block(panel(" RECENT TRANSACTIONS "))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_status_bar(f: &mut Frame, area: Rect, board: &ViewBoard) {
    let label = board.text(ViewTarget::RefreshButton);
    let refreshing = label.contains("Refreshing");
    let label_style = if refreshing {
        Style::default().fg(C_GOLD).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(C_ACCENT)
    };

    let line = Line::from(vec![
        Span::styled(format!(" {} ", label), label_style),
        Span::styled(" [R] Refresh  [Q] Quit", Style::default().fg(C_DIM)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
