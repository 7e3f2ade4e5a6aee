use crate::utils::error::{AppError, AppResult};
use crossterm::{
    cursor,
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{self, ClearType},
};
use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

pub fn prompt_input(prompt: &str) -> AppResult<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_string())
}

/// Ask for a value, keeping `current` when the answer is empty
pub fn prompt_with_default(label: &str, current: &str) -> AppResult<String> {
    let input = prompt_input(&format!("{} [{}]: ", label, current))?;
    Ok(if input.is_empty() { current.to_string() } else { input })
}

/// Read a line without echoing it
pub fn prompt_password(prompt: &str) -> AppResult<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    terminal::enable_raw_mode()?;
    let result = (|| -> AppResult<String> {
        let mut secret = String::new();
        loop {
            if let Event::Key(KeyEvent { code, modifiers, .. }) = event::read()? {
                match code {
                    KeyCode::Enter => return Ok(secret),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Err(AppError::System("Input cancelled by user".into()));
                    }
                    KeyCode::Esc => return Err(AppError::System("Input cancelled by user".into())),
                    KeyCode::Backspace => {
                        secret.pop();
                    }
                    KeyCode::Char(c) => secret.push(c),
                    _ => {}
                }
            }
        }
    })();
    let _ = terminal::disable_raw_mode();

    println!();
    result
}

/// Multi-line input: Enter submits, Ctrl+J or Shift+Enter starts a new line
pub fn prompt_multiline(prompt: &str) -> AppResult<String> {
    println!("{}", prompt);

    terminal::enable_raw_mode()?;
    let _ = execute!(io::stdout(), EnableBracketedPaste);

    let result = (|| -> AppResult<String> {
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut stdout = io::stdout();

        loop {
            match event::read()? {
                Event::Key(KeyEvent {
                    code: KeyCode::Char('j'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                })
                | Event::Key(KeyEvent {
                    code: KeyCode::Enter,
                    modifiers: KeyModifiers::SHIFT,
                    ..
                }) => {
                    lines.push(std::mem::take(&mut current));
                    print!("\r\n");
                    stdout.flush()?;
                }
                Event::Key(KeyEvent { code: KeyCode::Enter, .. }) => {
                    lines.push(current);
                    break;
                }
                Event::Key(KeyEvent { code: KeyCode::Esc, .. }) => {
                    return Err(AppError::System("Input cancelled by user".into()));
                }
                Event::Key(KeyEvent { code: KeyCode::Char(c), .. }) => {
                    current.push(c);
                    print!("{}", c);
                    stdout.flush()?;
                }
                Event::Key(KeyEvent { code: KeyCode::Backspace, .. }) => {
                    if current.pop().is_some() {
                        execute!(stdout, cursor::MoveLeft(1), terminal::Clear(ClearType::UntilNewLine))?;
                    } else if let Some(previous) = lines.pop() {
                        current = previous;
                        execute!(
                            stdout,
                            cursor::MoveUp(1),
                            cursor::MoveToColumn(0),
                            terminal::Clear(ClearType::UntilNewLine)
                        )?;
                        print!("{}", current);
                    }
                    stdout.flush()?;
                }
                Event::Paste(pasted) => {
                    let mut pasted_lines = pasted.lines().peekable();
                    while let Some(line) = pasted_lines.next() {
                        current.push_str(line);
                        if pasted_lines.peek().is_some() {
                            lines.push(std::mem::take(&mut current));
                            print!("{}\r\n", line);
                        } else {
                            print!("{}", line);
                        }
                    }
                    stdout.flush()?;
                }
                _ => {}
            }
        }
        Ok(lines.join("\n"))
    })();

    let _ = execute!(io::stdout(), DisableBracketedPaste);
    let _ = terminal::disable_raw_mode();

    println!();
    result
}

pub fn prompt_yes_no(prompt: &str) -> AppResult<bool> {
    loop {
        let input = prompt_input(&format!("{} [y/N]: ", prompt))?;
        match input.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" | "" => return Ok(false),
            _ => println!("Please enter 'y' or 'n'"),
        }
    }
}

/// `$EDITOR` when set, else the first common editor found on the system
pub fn detect_editor(configured: Option<&str>) -> String {
    if let Some(editor) = configured.filter(|e| !e.is_empty()) {
        return editor.to_string();
    }
    if let Ok(editor) = env::var("EDITOR")
        && !editor.is_empty()
    {
        return editor;
    }
    if cfg!(windows) {
        return "notepad".to_string();
    }
    ["nvim", "vim", "nano"]
        .iter()
        .find(|e| Path::new("/usr/bin").join(e).exists())
        .map(|e| e.to_string())
        .unwrap_or_else(|| "vi".to_string())
}

/// Edit `content` in a temporary file and return the trimmed result
pub fn edit_in_editor(content: &str, editor: &str) -> AppResult<String> {
    let file = env::temp_dir().join(format!("promptvault_{}.md", std::process::id()));
    std::fs::write(&file, content)?;

    let status = Command::new(editor)
        .arg(&file)
        .status()
        .map_err(|e| AppError::System(format!("Failed to execute editor '{}': {}", editor, e)));
    let edited = std::fs::read_to_string(&file);
    let _ = std::fs::remove_file(&file);

    if !status?.success() {
        return Err(AppError::System("Editor exited with non-zero status".into()));
    }
    Ok(edited?.trim().to_string())
}

/// Open an existing file in the editor
pub fn edit_file(path: &Path, editor: &str) -> AppResult<()> {
    let status = Command::new(editor)
        .arg(path)
        .status()
        .map_err(|e| AppError::System(format!("Failed to execute editor '{}': {}", editor, e)))?;

    if !status.success() {
        return Err(AppError::System("Editor exited with non-zero status".into()));
    }
    Ok(())
}

fn clipboard_tools() -> Vec<(&'static str, Vec<&'static str>)> {
    if cfg!(target_os = "macos") {
        vec![("pbcopy", vec![])]
    } else if cfg!(target_os = "windows") {
        vec![("clip", vec![])]
    } else {
        let wayland = env::var("XDG_SESSION_TYPE").is_ok_and(|s| s.eq_ignore_ascii_case("wayland"))
            || env::var("WAYLAND_DISPLAY").is_ok();
        let mut tools = vec![
            ("xclip", vec!["-selection", "clipboard"]),
            ("xsel", vec!["--clipboard", "--input"]),
        ];
        if wayland {
            tools.insert(0, ("wl-copy", vec![]));
        } else {
            tools.push(("wl-copy", vec![]));
        }
        tools
    }
}

/// Pipe `text` into the first clipboard tool that accepts it
pub fn copy_to_clipboard(text: &str) -> AppResult<()> {
    let mut last_error = None;

    for (tool, args) in clipboard_tools() {
        let mut child = match Command::new(tool).args(&args).stdin(Stdio::piped()).spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!(tool, error = %e, "clipboard tool unavailable");
                continue;
            }
        };

        if let Some(stdin) = child.stdin.as_mut()
            && let Err(e) = stdin.write_all(text.as_bytes())
        {
            last_error = Some(format!("Failed to write to {}: {}", tool, e));
            continue;
        }

        match child.wait() {
            Ok(status) if status.success() => return Ok(()),
            Ok(_) => last_error = Some(format!("{} failed", tool)),
            Err(e) => last_error = Some(format!("Failed to wait for {}: {}", tool, e)),
        }
    }

    Err(AppError::System(last_error.unwrap_or_else(|| {
        "No clipboard tool found (install wl-clipboard, xclip or xsel)".to_string()
    })))
}
