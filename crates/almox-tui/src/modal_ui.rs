use crate::App;
use almox_core::history::format_timestamp;
use almox_core::transaction::PendingTransaction;
use almox_core::TransactionKind;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

/// Yes/no dialog shown before anything is sent
pub fn render_confirmation(frame: &mut Frame, pending: &PendingTransaction) {
    let area = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, area);

    let color = kind_color(pending.kind());
    let lines = vec![
        Line::from(""),
        Line::from(pending.confirmation_message()),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Enter/s ", Style::default().bg(color).fg(Color::Black)),
            Span::raw(" Confirmar    "),
            Span::styled(" Esc/n ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" Cancelar"),
        ]),
    ];

    let dialog = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} {} ", pending.kind().icon(), pending.confirmation_title()))
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(dialog, area);
}

/// Transaction history popup. Returns where it was drawn so clicks outside can close it.
pub fn render_history(frame: &mut Frame, app: &App) -> Rect {
    let area = centered_rect(80, 75, frame.area());
    frame.render_widget(Clear, area);

    let history = app.ctx.history();
    let title = history
        .scope()
        .map(|scope| scope.title())
        .unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(Color::Cyan));

    if history.entries().is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("Nenhuma transação registrada"),
            Line::from(""),
            Line::from(Span::styled("Esc para fechar", Style::default().fg(Color::DarkGray))),
        ])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
        frame.render_widget(empty, area);
        return area;
    }

    let header = Row::new(vec!["Tipo", "Item", "Qtd", "Pessoa", "Saldo", "Data"])
        .style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow))
        .bottom_margin(1);

    let rows: Vec<Row> = history
        .entries()
        .iter()
        .skip(history.scroll())
        .map(|entry| {
            let item = entry
                .item_nome
                .clone()
                .or_else(|| entry.item_id.map(|id| format!("#{}", id)))
                .unwrap_or_default();
            Row::new(vec![
                Span::styled(
                    format!("{} {}", entry.tipo.icon(), entry.tipo.label()),
                    Style::default().fg(kind_color(entry.tipo)),
                ),
                Span::raw(item),
                Span::raw(entry.quantidade.to_string()),
                Span::raw(entry.nome_pessoa.clone()),
                Span::raw(entry.saldo_apos.to_string()),
                Span::styled(
                    format_timestamp(&entry.timestamp),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Min(16),
            Constraint::Length(5),
            Constraint::Length(16),
            Constraint::Length(6),
            Constraint::Length(20),
        ],
    )
    .header(header)
    .block(block.title_bottom(Line::from(" j/k rolar · Esc fechar ").centered()));

    frame.render_widget(table, area);
    area
}

fn kind_color(kind: TransactionKind) -> Color {
    match kind {
        TransactionKind::Retirada => Color::Red,
        TransactionKind::Devolucao => Color::Green,
    }
}

/// Helper to create centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
