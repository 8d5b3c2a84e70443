// UI rendering logic
use crate::{App, InputMode};
use almox_core::inventory::category_icon;
use almox_core::search::SearchResults;
use almox_core::sync::ConnectionStatus;
use almox_core::{Page, ToastLevel};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header + page tabs
            Constraint::Min(5),    // Page content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.ctx.current_page() {
        Page::Home => render_home(frame, app, chunks[1]),
        Page::Dashboard => render_dashboard(frame, app, chunks[1]),
        Page::Manage => render_manage(frame, app, chunks[1]),
        Page::Settings => render_settings(frame, app, chunks[1]),
        Page::Login => render_login(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);

    // Overlays, topmost last
    if app.ctx.history().is_open() {
        app.history_area = Some(crate::modal_ui::render_history(frame, app));
    } else {
        app.history_area = None;
    }

    if let Some(pending) = app.ctx.pending() {
        crate::modal_ui::render_confirmation(frame, pending);
    }

    render_toast(frame, app);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(20),
            Constraint::Min(30),
            Constraint::Length(34),
        ])
        .split(area);

    let logo = Paragraph::new(Line::from(Span::styled(
        "📦 Almoxarifado",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(logo, header_chunks[0]);

    let titles: Vec<Line> = Page::MENU
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let lock = if page.is_admin_only() && !app.ctx.is_logged_in() { " 🔒" } else { "" };
            Line::from(format!("{} {}{}", i + 1, page.title(), lock))
        })
        .collect();
    let selected = Page::MENU.iter().position(|p| *p == app.ctx.current_page());
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(selected.unwrap_or(0))
        .highlight_style(if selected.is_some() {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        })
        .divider("│");
    frame.render_widget(tabs, header_chunks[1]);

    let (dot, color) = match app.ctx.connection() {
        ConnectionStatus::Online => ("●", Color::Green),
        ConnectionStatus::Offline => ("●", Color::Red),
        ConnectionStatus::Unknown => ("○", Color::DarkGray),
    };
    let mut status = vec![
        Span::styled(dot, Style::default().fg(color)),
        Span::raw(format!(" {} ", app.ctx.connection().label())),
    ];
    if app.ctx.is_logged_in() {
        status.push(Span::styled("│ 🔑 Admin", Style::default().fg(Color::Magenta)));
    }
    let status = Paragraph::new(Line::from(status))
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, header_chunks[2]);
}

// --- Home -----------------------------------------------------------------

fn render_home(frame: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let inputs = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    render_filter_input(frame, app, inputs[0]);
    render_search_input(frame, app, inputs[1]);

    let width = frame.area().width;
    let (list_pct, detail_pct) = if width < 100 { (50, 50) } else { (45, 55) };
    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(list_pct),
            Constraint::Percentage(detail_pct),
        ])
        .split(rows[1]);

    render_item_list(frame, app, content[0]);
    render_detail(frame, app, content[1]);

    // Quick search results drop down over the list
    render_search_results(frame, app, inputs[1], rows[1]);
}

fn input_block(title: &str, active: bool) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        })
}

fn render_filter_input(frame: &mut Frame, app: &App, area: Rect) {
    let active = app.input_mode == InputMode::Filtering;
    let text = if app.ctx.filter_input().is_empty() && !active {
        Span::styled("/ para filtrar a lista", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(app.ctx.filter_input())
    };

    frame.render_widget(
        Paragraph::new(Line::from(text)).block(input_block(" Filtrar ", active)),
        area,
    );
    if active {
        frame.set_cursor_position((area.x + 1 + app.ctx.filter_input().chars().count() as u16, area.y + 1));
    }
}

fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let active = app.input_mode == InputMode::QuickSearch;
    let input = app.ctx.search().input();
    let text = if input.is_empty() && !active {
        Span::styled("s para busca rápida no servidor", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(input)
    };

    frame.render_widget(
        Paragraph::new(Line::from(text)).block(input_block(" 🔍 Busca rápida ", active)),
        area,
    );
    if active {
        frame.set_cursor_position((area.x + 1 + input.chars().count() as u16, area.y + 1));
    }
}

fn render_search_results(frame: &mut Frame, app: &App, anchor: Rect, below: Rect) {
    let height = match app.ctx.search().results() {
        SearchResults::Hidden => return,
        SearchResults::Empty => 3,
        SearchResults::Found(items) => (items.len() as u16 + 2).min(below.height),
    };
    let area = Rect {
        x: anchor.x,
        y: below.y,
        width: anchor.width,
        height,
    };
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    match app.ctx.search().results() {
        SearchResults::Found(items) => {
            let cursor = app.ctx.search().cursor();
            let rows: Vec<ListItem> = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let style = if i == cursor {
                        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    ListItem::new(Line::from(vec![
                        Span::raw(format!("{} ", category_icon(item.category_badge()))),
                        Span::raw(item.nome.clone()),
                        Span::styled(
                            format!("  ({} disp.)", item.quantidade_disponivel),
                            Style::default().fg(Color::Green),
                        ),
                    ]))
                    .style(style)
                })
                .collect();
            frame.render_widget(List::new(rows).block(block), area);
        }
        SearchResults::Empty => {
            let empty = Paragraph::new("Nenhum item encontrado")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
        }
        SearchResults::Hidden => {}
    }
}

fn render_item_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let inventory = app.ctx.inventory();
    let title = format!(
        " {} │ {} │ ↕ {} ",
        inventory.count_label(),
        inventory.category().label(),
        inventory.sort_key().label()
    );
    let block = Block::default().borders(Borders::ALL).title(title);

    if let Some(error) = app.ctx.items_error() {
        let error = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(error, Style::default().fg(Color::Red))),
            Line::from(""),
            Line::from(Span::styled(
                "R para tentar novamente",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(error, area);
        return;
    }

    if inventory.is_empty_view() {
        let message = if app.ctx.loading() && inventory.all().is_empty() {
            "Carregando itens..."
        } else {
            "Nenhum item encontrado"
        };
        let empty = Paragraph::new(vec![Line::from(""), Line::from(message)])
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows: Vec<ListItem> = inventory
        .visible()
        .map(|item| {
            let qty_color = if item.is_low_stock() { Color::Red } else { Color::Green };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", category_icon(item.category_badge()))),
                Span::raw(item.nome.clone()),
                Span::styled(
                    format!("  {}/{}", item.quantidade_disponivel, item.total_quantity()),
                    Style::default().fg(qty_color),
                ),
            ]))
        })
        .collect();

    let list = List::new(rows)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Detalhes ");

    let Some(item) = app.ctx.inventory().selected() else {
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from("Selecione um item na lista"),
            Line::from(Span::styled(
                "j/k para navegar",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),    // Item info
            Constraint::Length(1), // Usage gauge
            Constraint::Length(6), // Transaction form
        ])
        .split(inner);

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                item.nome.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("[{}]", item.category_badge()),
                Style::default().fg(Color::Magenta),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Disponível: ", label),
            Span::styled(
                item.quantidade_disponivel.to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::styled("   Em uso: ", label),
            Span::raw(item.in_use().to_string()),
            Span::styled("   Total: ", label),
            Span::raw(item.total_quantity().to_string()),
        ]),
    ];

    if let Some(location) = item.localizacao.as_deref().filter(|l| !l.is_empty()) {
        lines.push(Line::from(vec![
            Span::styled("📍 Local: ", label),
            Span::raw(location.to_string()),
        ]));
    }
    if let Some(category) = item.categoria.as_deref().filter(|c| !c.is_empty()) {
        lines.push(Line::from(vec![
            Span::styled("Categoria: ", label),
            Span::raw(category.to_string()),
        ]));
    }
    if let Some(codes) = item.codes_summary() {
        lines.push(Line::from(vec![Span::styled("Códigos: ", label), Span::raw(codes)]));
    }
    if item.is_low_stock() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "⚠️  Estoque baixo",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), sections[0]);

    let percent = item.usage_percent().min(100) as u16;
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Yellow))
        .percent(percent)
        .label(format!("{}% em uso", percent));
    frame.render_widget(gauge, sections[1]);

    render_transaction_form(frame, app, sections[2]);
}

fn render_transaction_form(frame: &mut Frame, app: &App, area: Rect) {
    let editing_name = app.input_mode == InputMode::EditingName;
    let editing_qty = app.input_mode == InputMode::EditingQuantity;
    let active = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let label = Style::default().fg(Color::DarkGray);

    let name = if app.ctx.person_name().is_empty() && !editing_name {
        Span::styled("(n para digitar)", label)
    } else {
        Span::raw(app.ctx.person_name())
    };
    let quantity = if editing_qty {
        Span::styled(format!("{}_", app.quantity_input), active)
    } else {
        Span::raw(app.ctx.stepper().value().to_string())
    };

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("👤 Nome: ", if editing_name { active } else { label }),
            name,
        ]),
        Line::from(vec![
            Span::styled("🔢 Quantidade: ", if editing_qty { active } else { label }),
            Span::raw("[-] "),
            quantity,
            Span::raw(" [+]"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(" r ", Style::default().bg(Color::Red).fg(Color::White)),
            Span::raw(" 📤 Retirar   "),
            Span::styled(" d ", Style::default().bg(Color::Green).fg(Color::Black)),
            Span::raw(" 📥 Devolver   "),
            Span::styled(" H ", Style::default().bg(Color::Blue).fg(Color::White)),
            Span::raw(" Histórico do item"),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), area);

    if editing_name {
        frame.set_cursor_position((
            area.x + 9 + app.ctx.person_name().chars().count() as u16,
            area.y + 1,
        ));
    }
}

// --- Dashboard ------------------------------------------------------------

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.ctx.inventory().stats();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(3)])
        .split(area);

    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(""),
        Line::from(vec![Span::styled("  Itens cadastrados:   ", label), Span::styled(stats.items.to_string(), value)]),
        Line::from(vec![Span::styled("  Unidades totais:     ", label), Span::styled(stats.total_units.to_string(), value)]),
        Line::from(vec![Span::styled("  Disponíveis:         ", label), Span::styled(stats.available_units.to_string(), Style::default().fg(Color::Green))]),
        Line::from(vec![Span::styled("  Em uso:              ", label), Span::styled(stats.in_use_units.to_string(), Style::default().fg(Color::Yellow))]),
        Line::from(vec![Span::styled("  Com estoque baixo:   ", label), Span::styled(stats.low_stock.to_string(), Style::default().fg(Color::Red))]),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" 📊 Resumo ")),
        chunks[0],
    );

    let low: Vec<ListItem> = app
        .ctx
        .inventory()
        .all()
        .iter()
        .filter(|item| item.is_low_stock())
        .map(|item| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", category_icon(item.category_badge()))),
                Span::raw(item.nome.clone()),
                Span::styled(
                    format!("  {} disp.", item.quantidade_disponivel),
                    Style::default().fg(Color::Red),
                ),
            ]))
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" ⚠️  Estoque baixo ");
    if low.is_empty() {
        frame.render_widget(
            Paragraph::new("Nenhum item com estoque baixo")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            chunks[1],
        );
    } else {
        frame.render_widget(List::new(low).block(block), chunks[1]);
    }
}

// --- Admin pages ----------------------------------------------------------

fn render_manage(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Itens em uso ({}) ", app.ctx.items_in_use().len()));

    if app.ctx.items_in_use().is_empty() {
        frame.render_widget(
            Paragraph::new("Nenhuma unidade em uso no momento")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let rows: Vec<ListItem> = app
        .ctx
        .items_in_use()
        .iter()
        .map(|unit| {
            let name = app
                .ctx
                .inventory()
                .get(unit.item_id)
                .map(|item| item.nome.clone())
                .unwrap_or_else(|| format!("Item #{}", unit.item_id));
            let mut spans = vec![
                Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!("  👤 {}", unit.nome_pessoa)),
            ];
            if let Some(code) = &unit.codigo {
                spans.push(Span::styled(format!("  #{}", code), Style::default().fg(Color::DarkGray)));
            }
            if let Some(ts) = &unit.timestamp {
                spans.push(Span::styled(
                    format!("  {}", almox_core::history::format_timestamp(ts)),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    frame.render_widget(List::new(rows).block(block), area);
}

fn render_settings(frame: &mut Frame, app: &App, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::from(""), Line::from(Span::styled(
        "  Notificações do Slack",
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    match app.ctx.slack().settings() {
        Some(settings) => {
            let (state, color) = if settings.enabled {
                ("Ativadas", Color::Green)
            } else {
                ("Desativadas", Color::Red)
            };
            lines.push(Line::from(vec![
                Span::styled("  Estado: ", label),
                Span::styled(state, Style::default().fg(color)),
            ]));
            if !settings.channel.is_empty() {
                lines.push(Line::from(vec![
                    Span::styled("  Canal: ", label),
                    Span::raw(settings.channel.clone()),
                ]));
            }
            if !settings.configured {
                lines.push(Line::from(Span::styled(
                    "  Webhook do Slack não configurado no servidor",
                    Style::default().fg(Color::Yellow),
                )));
            }
        }
        None => lines.push(Line::from(Span::styled("  Carregando...", label))),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" t ", Style::default().bg(Color::Blue).fg(Color::White)),
        Span::raw(" Ativar/desativar Slack   "),
        Span::styled(" S ", Style::default().bg(Color::Blue).fg(Color::White)),
        Span::raw(" Sincronizar com a planilha   "),
        Span::styled(" L ", Style::default().bg(Color::Blue).fg(Color::White)),
        Span::raw(" Sair"),
    ]));

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" ⚙️  Configurações ")),
        area,
    );
}

fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let popup = crate::modal_ui::centered_rect(50, 50, area);
    let user_active = app.input_mode == InputMode::LoginUser;
    let pass_active = app.input_mode == InputMode::LoginPassword;
    let field = |active: bool| {
        if active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Usuário: ", field(user_active)),
            Span::raw(app.login_user.clone()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Senha:   ", field(pass_active)),
            Span::raw("•".repeat(app.login_password.chars().count())),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Enter para continuar · Tab alterna · Esc volta",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" 🔐 Acesso administrativo ")
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        popup,
    );
}

// --- Chrome ---------------------------------------------------------------

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if app.ctx.loading() {
        let loading = Paragraph::new(Span::styled(
            " ⏳ Carregando...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(loading, area);
        return;
    }

    let hints = match app.input_mode {
        InputMode::Filtering => "Digite para filtrar · Enter/Esc conclui",
        InputMode::QuickSearch => "Digite para buscar · ↑↓ navega · Enter seleciona · Esc fecha",
        InputMode::EditingName => "Digite seu nome · Enter conclui",
        InputMode::EditingQuantity => "Digite a quantidade · Enter confirma · Esc cancela",
        InputMode::LoginUser | InputMode::LoginPassword => "Login de administrador",
        InputMode::Normal => match app.ctx.current_page() {
            Page::Home => "j/k navegar · / filtrar · s buscar · c categoria · o ordem · +/- qtd · n nome · r retirar · d devolver · h histórico · Tab páginas · q sair",
            Page::Dashboard | Page::Manage | Page::Settings | Page::Login => {
                "Tab/1-4 páginas · h histórico · S sincronizar · L login/logout · q sair"
            }
        },
    };

    let bar = Paragraph::new(Span::styled(format!(" {}", hints), Style::default().fg(Color::DarkGray)));
    frame.render_widget(bar, area);
}

fn render_toast(frame: &mut Frame, app: &App) {
    let Some(toast) = app.ctx.current_toast() else {
        return;
    };

    let color = match toast.level {
        ToastLevel::Info => Color::Blue,
        ToastLevel::Success => Color::Green,
        ToastLevel::Warning => Color::Yellow,
        ToastLevel::Error => Color::Red,
    };

    let screen = frame.area();
    let text = format!("{} {}", toast.level.icon(), toast.message);
    let width = (text.chars().count() as u16 + 4).min(screen.width.saturating_sub(2)).max(20);
    let area = Rect {
        x: screen.width.saturating_sub(width + 1),
        y: screen.height.saturating_sub(5),
        width: width.min(screen.width),
        height: 3.min(screen.height),
    };

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color))),
        area,
    );
}
