//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::cpu::memory::MEMORY_SIZE;
use crate::cpu::registers::{Registers, REGISTER_COUNT, SP, STACK_TOP};
use super::app::DebuggerApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .split(frame.area());

    // Left side: code and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_disassembly(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    // Right side: memory, output and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_output(frame, right_chunks[1], app);
    draw_help(frame, right_chunks[2]);
}

/// Draw disassembly view.
fn draw_disassembly(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let disasm = app.get_disassembly((area.height as usize).saturating_sub(2));

    let items: Vec<ListItem> = disasm
        .iter()
        .map(|(addr, instr, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(addr) { "●" } else { " " };
            let text = format!("{}{:02X}: {}", prefix, addr, instr);

            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(addr) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(format!("{} {}", bp, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Disassembly ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw register state.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = app.cpu.regs.as_array();

    let register_line = |range: std::ops::Range<usize>| {
        let spans: Vec<Span> = range
            .flat_map(|i| {
                let value = regs[i];
                let style = if value == 0 {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::White)
                };
                vec![
                    Span::raw(format!("{:>3}: ", Registers::name(i as u8))),
                    Span::styled(format!("{:02X} ({:>3})  ", value, value), style),
                ]
            })
            .collect();
        Line::from(spans)
    };

    let content = vec![
        register_line(0..4),
        register_line(4..REGISTER_COUNT),
        Line::from(vec![
            Span::raw(" PC: "),
            Span::styled(format!("{:02X}", app.cpu.pc), Style::default().fg(Color::Yellow)),
            Span::raw("   Stack depth: "),
            Span::styled(
                format!("{}", STACK_TOP.saturating_sub(regs[SP as usize])),
                Style::default().fg(Color::Magenta),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Cycles: "),
            Span::styled(format!("{}", app.cpu.cycles), Style::default().fg(Color::Cyan)),
            Span::raw("   State: "),
            Span::styled(format!("{:?}", app.cpu.state),
                if app.cpu.is_running() {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Red)
                }),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw memory view, eight bytes per row.
fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    let pc = app.cpu.pc as usize;
    let sp = app.cpu.regs.sp() as usize;

    let items: Vec<ListItem> = (app.mem_scroll..)
        .take(visible_rows)
        .map(|row| row * 8)
        .filter(|&base| base < MEMORY_SIZE)
        .map(|base| {
            let mut spans = vec![Span::raw(format!("{:02X}: ", base))];
            for (addr, value) in app.cpu.mem.dump(base, 8) {
                let style = if addr == pc {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else if addr >= sp && addr < STACK_TOP as usize {
                    Style::default().fg(Color::Magenta)
                } else if value != 0 {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                spans.push(Span::styled(format!("{:02X} ", value), style));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

/// Draw the PRN output and diagnostics, newest last.
fn draw_output(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible = (area.height as usize).saturating_sub(2);

    let mut lines: Vec<Line> = app.output.values
        .iter()
        .map(|v| Line::from(v.to_string()))
        .collect();
    lines.extend(app.output.diagnostics.iter().map(|d| {
        Line::from(Span::styled(d.clone(), Style::default().fg(Color::Red)))
    }));
    let skip = lines.len().saturating_sub(visible);

    let output = Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>())
        .block(Block::default()
            .title(" Output ")
            .borders(Borders::ALL));

    frame.render_widget(output, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint"),
        Line::from("x: Reset  ↑↓: Scroll memory  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}
