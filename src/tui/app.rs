//! Debugger application state and logic.

use crate::{Cpu, CaptureReporter};
use crate::asm::disasm::{disassemble_at, listing};
use crate::cpu::memory::MEMORY_SIZE;
use std::collections::HashSet;

/// Debugger application state.
pub struct DebuggerApp {
    /// The CPU being debugged.
    pub cpu: Cpu,
    /// Everything the program printed so far.
    pub output: CaptureReporter,
    /// Loaded program bytes, reloaded on reset.
    pub program: Vec<u8>,
    /// Breakpoints (by address).
    pub breakpoints: HashSet<u8>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Memory view scroll offset, in rows of 8 bytes.
    pub mem_scroll: usize,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(program: Vec<u8>) -> Self {
        let mut cpu = Cpu::new();
        let status = match cpu.load_program(&program) {
            Ok(()) => "Ready. Press 's' to step, 'r' to run, 'q' to quit.".to_string(),
            Err(e) => format!("Load failed: {}", e),
        };

        Self {
            cpu,
            output: CaptureReporter::new(),
            program,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status,
            mem_scroll: 0,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.cpu.is_running() {
            self.status = format!("CPU stopped: {:?}", self.cpu.state);
            self.running = false;
            return;
        }

        let pc = self.cpu.pc;
        match self.cpu.step(&mut self.output) {
            Ok(instr) => {
                let (text, _) = disassemble_at(self.cpu.mem.as_slice(), instr.address);
                self.status = format!("PC={:02X}: {}", pc, text);
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
    }

    /// Run until halt, breakpoint, or error.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if !self.cpu.is_running() {
            self.running = false;
            self.status = format!("Stopped ({:?}) after {} cycles", self.cpu.state, self.cpu.cycles);
            return;
        }

        // Check for breakpoint
        let pc = self.cpu.pc;
        if self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at PC={:02X}", pc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.pc;
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={:02X}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={:02X}", pc);
        }
    }

    /// Reset CPU to initial state.
    pub fn reset(&mut self) {
        self.cpu = Cpu::new();
        let _ = self.cpu.load_program(&self.program);
        self.output.clear();
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Scroll the memory view, clamped to the last row.
    pub fn scroll_memory(&mut self, delta: isize) {
        let max_row = MEMORY_SIZE / 8 - 1;
        self.mem_scroll = self.mem_scroll.saturating_add_signed(delta).min(max_row);
    }

    /// Get disassembly around the current PC.
    ///
    /// Sweeps the loaded program from address 0 so instruction boundaries
    /// line up; a PC outside the program is shown on its own.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(u8, String, bool)> {
        let pc = self.cpu.pc as usize;
        let memory = self.cpu.mem.as_slice();
        let mut sweep = listing(&memory[..self.program.len().min(MEMORY_SIZE)]);

        if !sweep.iter().any(|(addr, _, _)| *addr == pc) {
            let (text, len) = disassemble_at(memory, pc);
            sweep.push((pc, text, len));
            sweep.sort_by_key(|(addr, _, _)| *addr);
        }

        let current = sweep.iter().position(|(addr, _, _)| *addr == pc).unwrap_or(0);
        let start = current.saturating_sub(lines / 2);

        sweep
            .into_iter()
            .skip(start)
            .take(lines)
            .map(|(addr, text, _)| (addr as u8, text, addr == pc))
            .collect()
    }
}

/// Run the debugger with a program.
pub fn run_debugger(program: Vec<u8>) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create app
    let mut app = DebuggerApp::new(program);

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        // Handle input
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => app.scroll_memory(-1),
                        KeyCode::Down => app.scroll_memory(1),
                        _ => {}
                    }
                }
            }
        }

        // Tick for continuous running
        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
