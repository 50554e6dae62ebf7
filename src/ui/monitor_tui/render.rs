use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use super::mode::{KillButton, UiMode};
use super::theme::Layout as ScreenLayout;
use super::widgets::{bordered, colored_gauge, history_sparkline, temp_color};
use crate::core::system_monitor::{ApplicationState, MetricsHistory, SortColumn};
use crate::ui::formatters::{
    format_capacity, format_memory_size, format_rate, format_temp, format_time,
    format_uptime, truncate_with_ellipsis,
};

/// Main render function
pub fn render_ui(frame: &mut Frame, state: &ApplicationState) {
    let area = frame.area();

    match state.layout {
        ScreenLayout::Default => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Percentage(30), // CPU + power
                    Constraint::Length(7),      // memory/GPU + net/disk + links
                    Constraint::Min(6),         // processes
                    Constraint::Length(1),      // footer
                ])
                .split(area);

            let top = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[0]);
            render_cpu_section(frame, top[0], state);
            render_power_section(frame, top[1], state);

            let middle = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(34),
                    Constraint::Percentage(33),
                    Constraint::Percentage(33),
                ])
                .split(chunks[1]);
            render_memory_gpu_section(frame, middle[0], state);
            render_network_disk_section(frame, middle[1], state);
            render_links_section(frame, middle[2], state);

            render_processes_section(frame, chunks[2], state);
            render_footer(frame, chunks[3], state);
        }
        ScreenLayout::Compact => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(6),
                    Constraint::Length(1),
                ])
                .split(area);
            render_compact_gauges(frame, chunks[0], state);
            render_processes_section(frame, chunks[1], state);
            render_footer(frame, chunks[2], state);
        }
        ScreenLayout::Processes => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(1)])
                .split(area);
            render_processes_section(frame, chunks[0], state);
            render_footer(frame, chunks[1], state);
        }
    }

    match &state.mode {
        UiMode::HelpOverlay { .. } => render_help_overlay(frame, area, state),
        UiMode::InfoOverlay { scroll, .. } => render_info_overlay(frame, area, state, *scroll),
        UiMode::KillConfirm {
            pid,
            command,
            focus,
        } => render_kill_modal(frame, area, state, *pid, command, *focus),
        UiMode::Normal | UiMode::Search => {}
    }
}

fn render_cpu_section(frame: &mut Frame, area: Rect, state: &ApplicationState) {
    let accent = state.display_theme().color();
    let cpu = &state.cpu;

    let mut title = format!(
        " CPU {} ({} cores) │ {:.1}% ",
        state.system_info.cpu_brand,
        cpu.core_usages.len(),
        cpu.total_usage
    );
    if cpu.throttled {
        title.push_str("│ THROTTLED ");
    }

    let block = bordered(title, accent);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || cpu.core_usages.is_empty() {
        return;
    }

    // spread cores over as many columns as needed to fit the height
    let rows = inner.height as usize;
    let columns = cpu.core_usages.len().div_ceil(rows).max(1);
    let column_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
        .split(inner);

    for (col, column_area) in column_areas.iter().enumerate() {
        let cores = cpu.core_usages.iter().enumerate().skip(col * rows).take(rows);
        for (line, (core, usage)) in cores.enumerate() {
            let line_area = Rect {
                x: column_area.x,
                y: column_area.y + line as u16,
                width: column_area.width.saturating_sub(1),
                height: 1,
            };
            let gauge = colored_gauge(*usage, format!("{:>2} {:>5.1}%", core, usage), accent);
            frame.render_widget(gauge, line_area);
        }
    }
}

fn render_power_section(frame: &mut Frame, area: Rect, state: &ApplicationState) {
    let accent = state.display_theme().color();
    let cpu = &state.cpu;
    let units = state.units;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    let lines = vec![
        Line::from(format!(
            "CPU {:.2}W  GPU {:.2}W  ANE {:.2}W  DRAM {:.2}W  System {:.2}W",
            cpu.cpu_watts, cpu.gpu_watts, cpu.ane_watts, cpu.dram_watts, cpu.system_watts
        )),
        Line::from(vec![
            Span::raw("CPU "),
            Span::styled(
                format_temp(cpu.cpu_temp, units.temp),
                Style::default().fg(temp_color(cpu.cpu_temp)),
            ),
            Span::raw("  GPU "),
            Span::styled(
                format_temp(cpu.gpu_temp, units.temp),
                Style::default().fg(temp_color(cpu.gpu_temp)),
            ),
            Span::raw(format!("  Thermal: {}", cpu.thermal_state)),
        ]),
    ];
    let info = Paragraph::new(lines).block(bordered(" Power ".to_string(), accent));
    frame.render_widget(info, chunks[0]);

    let average = MetricsHistory::average_nonzero(&state.history.power_watts);
    let title = format!(
        " {:.2}W │ max {:.2}W │ avg {:.2}W ",
        cpu.package_watts,
        state.power_scale.max() / 1.1,
        average
    );
    let sparkline = history_sparkline(
        &state.history.power_watts,
        state.power_scale.max(),
        chunks[1].width,
        accent,
        title,
    );
    frame.render_widget(sparkline, chunks[1]);
}

fn render_memory_gpu_section(frame: &mut Frame, area: Rect, state: &ApplicationState) {
    let accent = state.display_theme().color();
    let memory = &state.memory;
    let gpu = &state.gpu;

    let block = bordered(" Memory / GPU ".to_string(), accent);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let mem_percent = memory.usage_percent();
    let mem_label = format!(
        "RAM {} / {} ({:.0}%)",
        format_memory_size(memory.used),
        format_memory_size(memory.total),
        mem_percent
    );
    frame.render_widget(colored_gauge(mem_percent, mem_label, accent), rows[0]);

    let swap = format!(
        "Swap {} / {}",
        format_memory_size(memory.swap_used),
        format_memory_size(memory.swap_total)
    );
    frame.render_widget(Paragraph::new(swap), rows[1]);

    let gpu_label = format!("GPU {:.0}% @ {} MHz", gpu.active_percent, gpu.freq_mhz);
    frame.render_widget(colored_gauge(gpu.active_percent, gpu_label, accent), rows[2]);

    let gpu_avg = MetricsHistory::average_nonzero(&state.history.gpu_usage);
    let gpu_line = format!(
        "{:.2}W  {}  avg {:.1}%",
        gpu.power_watts,
        format_temp(gpu.temp as f64, state.units.temp),
        gpu_avg
    );
    frame.render_widget(Paragraph::new(gpu_line), rows[3]);
}

fn render_network_disk_section(frame: &mut Frame, area: Rect, state: &ApplicationState) {
    let accent = state.display_theme().color();
    let nd = &state.net_disk;
    let units = state.units;

    let lines = vec![
        Line::from(format!(
            "Net ↑ {} ({:.0} pkt/s)",
            format_rate(nd.out_bytes_per_sec, units.network),
            nd.out_packets_per_sec
        )),
        Line::from(format!(
            "Net ↓ {} ({:.0} pkt/s)",
            format_rate(nd.in_bytes_per_sec, units.network),
            nd.in_packets_per_sec
        )),
        Line::from(format!(
            "Disk R {} ({:.0} ops/s)",
            format_rate(nd.read_bytes_per_sec, units.disk),
            nd.read_ops_per_sec
        )),
        Line::from(format!(
            "Disk W {} ({:.0} ops/s)",
            format_rate(nd.write_bytes_per_sec, units.disk),
            nd.write_ops_per_sec
        )),
    ];

    let para = Paragraph::new(lines).block(bordered(" Network & Disk ".to_string(), accent));
    frame.render_widget(para, area);
}

fn render_links_section(frame: &mut Frame, area: Rect, state: &ApplicationState) {
    let accent = state.display_theme().color();
    let links = &state.links;

    if links.interfaces.is_empty() {
        let para = Paragraph::new("No active links")
            .style(Style::default().fg(Color::DarkGray))
            .block(bordered(" Links ".to_string(), accent));
        frame.render_widget(para, area);
        return;
    }

    let title = format!(
        " {} │ ↓ {} ↑ {} ",
        links
            .interfaces
            .iter()
            .map(|l| l.interface.as_str())
            .collect::<Vec<_>>()
            .join(","),
        format_rate(links.total_in_per_sec, state.units.network),
        format_rate(links.total_out_per_sec, state.units.network)
    );
    let sparkline = history_sparkline(
        &state.history.link_in,
        state.link_scale.max(),
        area.width,
        accent,
        title,
    );
    frame.render_widget(sparkline, area);
}

fn render_compact_gauges(frame: &mut Frame, area: Rect, state: &ApplicationState) {
    let accent = state.display_theme().color();
    let block = bordered(
        format!(
            " {} │ {:.2}W │ {} ",
            state.system_info.host_name,
            state.cpu.package_watts,
            format_temp(state.cpu.cpu_temp, state.units.temp)
        ),
        accent,
    );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(inner);

    let cpu = state.cpu.total_usage;
    let mem = state.memory.usage_percent();
    let gpu = state.gpu.active_percent;
    frame.render_widget(
        colored_gauge(cpu, format!("CPU {:.0}%", cpu), accent),
        columns[0],
    );
    frame.render_widget(
        colored_gauge(mem, format!("MEM {:.0}%", mem), accent),
        columns[1],
    );
    frame.render_widget(
        colored_gauge(gpu, format!("GPU {:.0}%", gpu), accent),
        columns[2],
    );
}

fn render_processes_section(frame: &mut Frame, area: Rect, state: &ApplicationState) {
    let theme = state.display_theme();
    let table_state = &state.processes;
    let sort = table_state.sort_spec();

    let mut title = format!(" Processes ({}) ", table_state.visible().len());
    if table_state.is_filtering() {
        title.push_str(&format!("│ filter: {} ", table_state.filter()));
    }

    let block = bordered(title, theme.color());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 2 {
        return;
    }

    let header = Row::new(SortColumn::ALL.iter().map(|column| {
        let mut label = column.title().to_string();
        if *column == sort.column {
            // arrow shows the direction rows actually run in
            let descending = column.descending_by_default() != sort.reverse;
            label.push(if descending { '▼' } else { '▲' });
        }
        let style = if *column == sort.column {
            Style::default()
                .fg(theme.color())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Cell::from(label).style(style)
    }))
    .height(1);

    let rows: Vec<Row> = table_state
        .visible()
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(p.pid.to_string()),
                Cell::from(truncate_with_ellipsis(&p.user, 10)),
                Cell::from(format_memory_size(p.virtual_bytes)),
                Cell::from(format_memory_size(p.resident_bytes)),
                Cell::from(format!("{:.1}", p.cpu_percent)),
                Cell::from(format!("{:.1}", p.memory_percent)),
                Cell::from(format_time(p.cpu_time_secs)),
                Cell::from(p.command.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(11),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .row_highlight_style(
        Style::default()
            .fg(theme.contrast())
            .bg(theme.color())
            .add_modifier(Modifier::BOLD),
    );

    let mut selection = TableState::default();
    if !table_state.visible().is_empty() {
        selection.select(Some(table_state.selected_index()));
    }
    frame.render_stateful_widget(table, inner, &mut selection);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &ApplicationState) {
    let text = match state.mode {
        UiMode::Search => format!(" Search: {}_  (Enter: keep │ Esc: clear)", state.processes.filter()),
        _ => format!(
            " q: Quit │ h: Help │ i: Info │ /: Search │ F9: Kill │ -/+ {}ms │ {} │ {}{}",
            state.interval_ms,
            state.layout,
            state.display_theme(),
            if state.party_mode { " │ party" } else { "" }
        ),
    };
    let para = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect, state: &ApplicationState) {
    let help_text = r#"
    hwtop - Help

    Keyboard Shortcuts:
    ─────────────────────────────────────
    q / Ctrl-C    Quit
    h / ?         Toggle this help screen
    i             Toggle system info
    /             Search processes by command
    Esc           Clear the search filter
    F9            Terminate the selected process
    ↑↓ / k j      Move the selection
    g G           Jump to first / last process
    ← →           Change sort column
    Enter/Space   Reverse sort order
    + / -         Change the update interval
    c             Cycle color theme
    l             Cycle layout
    p             Party mode
    r             Redraw the screen
    "#;

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(state.display_theme().color()));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left);

    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

fn render_info_overlay(frame: &mut Frame, area: Rect, state: &ApplicationState, scroll: u16) {
    let info = &state.system_info;
    let now = chrono::Utc::now().timestamp();

    let lines: Vec<Line> = [
        ("Host", info.host_name.clone()),
        ("OS", info.os_version.clone()),
        ("Kernel", info.kernel_version.clone()),
        ("CPU", info.cpu_brand.clone()),
        ("Cores", info.core_count.to_string()),
        (
            "GPU",
            info.gpu_name.clone().unwrap_or_else(|| "-".to_string()),
        ),
        ("Memory", format_capacity(state.memory.total)),
        ("Swap", format_capacity(state.memory.swap_total)),
        ("Uptime", format_uptime(info.uptime_secs(now))),
        ("Interval", format!("{}ms", state.interval_ms)),
        ("Theme", state.theme.to_string()),
        ("Layout", state.layout.to_string()),
        (
            "Units",
            format!(
                "net {:?}, disk {:?}",
                state.units.network, state.units.disk
            )
            .to_lowercase(),
        ),
        ("Temp unit", state.units.temp.to_string()),
    ]
    .into_iter()
    .map(|(key, value)| {
        Line::from(vec![
            Span::styled(
                format!("{:<14}", key),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(value),
        ])
    })
    .collect();

    let block = Block::default()
        .title(" System Info ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(state.display_theme().color()));

    let max_scroll = (lines.len() as u16).saturating_sub(1);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((scroll.min(max_scroll), 0));

    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

fn render_kill_modal(
    frame: &mut Frame,
    area: Rect,
    state: &ApplicationState,
    pid: u32,
    command: &str,
    focus: KillButton,
) {
    let theme = state.display_theme();
    let button = |label: &'static str, focused: bool| {
        if focused {
            Span::styled(
                label,
                Style::default()
                    .fg(theme.contrast())
                    .bg(theme.color())
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw(label)
        }
    };

    let lines = vec![
        Line::from(""),
        Line::from(format!("Send SIGTERM to {} ({})?", truncate_with_ellipsis(command, 30), pid))
            .alignment(Alignment::Center),
        Line::from(""),
        Line::from(vec![
            button(" [ Yes ] ", focus == KillButton::Confirm),
            Span::raw("   "),
            button(" [ No ] ", focus == KillButton::Cancel),
        ])
        .alignment(Alignment::Center),
    ];

    let block = Block::default()
        .title(" Terminate process ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightRed));

    let popup_area = centered_rect(50, 25, area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
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
