pub mod color;
pub mod filter;
pub mod formatting;
pub mod note;
pub mod palette;
pub mod render;
pub mod save;
pub mod session;
pub mod store;
pub mod tags;

use crate::formatting::FormatContext;
use crate::note::Note;
use crate::session::{NoteEdit, SaveReport, Session};
use crate::store::JsonFileGateway;
use crate::tags::CreateTag;
use std::env;
use std::error::Error;
use std::io;
use std::path::PathBuf;

type CliSession = Session<JsonFileGateway>;

pub fn entry() -> Result<(), Box<dyn Error>> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_help();
        return Ok(());
    }

    let cmd = args.remove(0);
    let dir = data_dir()?;
    let gateway = JsonFileGateway::new(&dir);
    let mut session = Session::open(gateway)?;
    let ctx = FormatContext::from_env();

    match cmd.as_str() {
        "add" => quick_add(args, &mut session)?,
        "new" => new_note(args, &mut session)?,
        "list" => list_notes(args, &mut session, &ctx)?,
        "view" => view_note(args, &session, &ctx, false)?,
        "render" => view_note(args, &session, &ctx, true)?,
        "edit" => edit_note(args, &mut session)?,
        "delete" => delete_notes(args, &mut session)?,
        "tags" => list_tags(&mut session, &ctx),
        "tag" => tag_command(args, &mut session)?,
        "palette" => palette_command(args, &mut session, &ctx)?,
        "save" => session.request_save(),
        "path" => println!("{}", dir.display()),
        "help" => print_help(),
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
        }
    }

    // One coalesced write per invocation, no matter how many mutations the
    // command made.
    match session.flush() {
        Some(report) => finish_save(report),
        None => Ok(()),
    }
}

fn print_help() {
    println!(
        "\
Chroma Notes CLI
Usage:
  cn add \"note text\" [-t tag]     Quick add with generated title
  cn new <title> [body...] [-t tag]
                                  New note with title and optional body
  cn list [--sort <field>] [--asc|--desc] [-s|--search <text>] [-t|--tag <tag>]
                                  List notes (sort by created|updated|title; default updated desc;
                                  repeated -t narrows: notes must carry every tag)
  cn view <id> [--render|-r] [--plain]
                                  Show a note (render markdown with --render; disable color with --plain)
  cn render <id>                  Same as: cn view <id> --render
  cn edit <id> [--title T] [--body B] [--add-tag t] [--remove-tag t]
                                  Edit fields of a note
  cn delete <ids...>              Delete one or more notes
  cn tags                         Tag library: every tag with usage count and color
  cn tag new <name>               Create a tag with a generated color
  cn tag color <name> <hex>       Set a tag's color (#rgb or #rrggbb)
  cn tag rm <name> --yes          Remove a tag from every note and the color map
  cn palette                      List saved custom colors
  cn palette add <hex>            Save a custom color (bounded, oldest evicted)
  cn palette rm <index>           Remove a saved color by position
  cn palette clear --yes          Forget all saved colors
  cn save                         Persist now and report the result
  cn path                         Show the data directory
  cn help                         Show this message

Environment:
  CHROMA_NOTES_DIR                Override data directory (default: ~/.chroma_notes)
"
    );
}

fn data_dir() -> io::Result<PathBuf> {
    if let Ok(dir) = env::var("CHROMA_NOTES_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = env::var("HOME")
        .map_err(|_| io::Error::other("HOME not set; set CHROMA_NOTES_DIR explicitly"))?;
    Ok(PathBuf::from(home).join(".chroma_notes"))
}

fn finish_save(report: SaveReport) -> Result<(), Box<dyn Error>> {
    match (&report.outcome, report.silent) {
        (Ok(saved), false) => {
            println!("Saved {saved} notes.");
            Ok(())
        }
        (Err(e), false) => Err(format!("Save failed: {e}").into()),
        // Silent saves fail quietly; the session already logged the error.
        _ => Ok(()),
    }
}

/// Split `-t <tag>` pairs out of a raw argument list, returning the tags
/// and everything else in order. A trailing tag flag with no value is a
/// usage error.
fn split_tags(args: Vec<String>) -> Result<(Vec<String>, Vec<String>), Box<dyn Error>> {
    let mut tags = Vec::new();
    let mut rest = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-t" | "--tag" => match iter.next() {
                Some(v) => {
                    let tag = v.trim().to_string();
                    if !tag.is_empty() {
                        tags.push(tag);
                    }
                }
                None => return Err(format!("Provide a tag after {arg}").into()),
            },
            _ => rest.push(arg),
        }
    }
    Ok((tags, rest))
}

fn quick_add(args: Vec<String>, session: &mut CliSession) -> Result<(), Box<dyn Error>> {
    if args.is_empty() {
        return Err("Provide the note body, e.g. `cn add \"text\"`".into());
    }
    let (tags, body_parts) = split_tags(args)?;
    if body_parts.is_empty() {
        return Err("Provide the note body after tags, e.g. `cn add \"text\" -t tag`".into());
    }
    let body = body_parts.join(" ");
    let title = format!("Quick note {}", chrono::Local::now().format("%d%b%y %H:%M"));
    let note = session.add_note(title, body, tags);
    println!("Added note {} ({})", note.id, note.title);
    Ok(())
}

fn new_note(args: Vec<String>, session: &mut CliSession) -> Result<(), Box<dyn Error>> {
    if args.is_empty() {
        return Err("Usage: cn new <title> [body] [-t tag]".into());
    }
    let title = args[0].clone();
    let (tags, body_parts) = split_tags(args.into_iter().skip(1).collect())?;
    let body = body_parts.join(" ");
    let note = session.add_note(title, body, tags);
    println!("Created note {} ({})", note.id, note.title);
    Ok(())
}

fn list_notes(
    args: Vec<String>,
    session: &mut CliSession,
    ctx: &FormatContext,
) -> Result<(), Box<dyn Error>> {
    let mut sort_field = "updated".to_string();
    let mut ascending = false;
    let mut search: Option<String> = None;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--sort" => match iter.next() {
                Some(v) => sort_field = v,
                None => return Err("Provide a sort field: created|updated|title".into()),
            },
            "--asc" => ascending = true,
            "--desc" => ascending = false,
            "-s" | "--search" => match iter.next() {
                Some(v) => search = Some(v),
                None => return Err("Provide a search string after -s/--search".into()),
            },
            "-t" | "--tag" => match iter.next() {
                Some(v) => session.filter.toggle(&v),
                None => return Err("Provide a tag after -t/--tag".into()),
            },
            other => return Err(format!("Unknown flag for list: {other}").into()),
        }
    }

    let mut notes: Vec<&Note> = session.visible_notes();

    if let Some(q) = &search {
        let ql = q.to_lowercase();
        notes.retain(|n| {
            n.title.to_lowercase().contains(&ql) || n.body.to_lowercase().contains(&ql)
        });
    }

    notes.sort_by(|a, b| {
        let ord = match sort_field.as_str() {
            "created" => a.created_at.cmp(&b.created_at),
            "title" => note::cmp_titles(&a.title, &b.title),
            _ => a.updated_at.cmp(&b.updated_at),
        };
        if ascending { ord } else { ord.reverse() }
    });

    if notes.is_empty() {
        println!("No notes match. Try `cn add \"text\"`.");
        return Ok(());
    }

    let width = preview_width();
    for n in notes {
        let preview = clip(&preview_line(n), width);
        let id_text = ctx.format_id(n.id);
        let ts_text = ctx.format_timestamp(&n.updated_at);
        let tags_text = ctx.format_tag_list(&n.tags, &session.tag_colors);

        if tags_text.is_empty() {
            println!("{id_text} {ts_text} {preview}");
        } else {
            println!("{id_text} {ts_text} {preview} {tags_text}");
        }
    }
    Ok(())
}

fn preview_width() -> usize {
    let term = terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(120);
    // Leave room for the id, timestamp and a few tag chips.
    term.saturating_sub(40).clamp(20, 100)
}

/// Truncate to a character budget, marking the cut with an ellipsis.
fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut head: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    head.push('…');
    head
}

fn preview_line(note: &Note) -> String {
    let first_line = note
        .body
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .trim();
    let title = note.title.trim();
    // Suppress auto-generated titles like "Quick note ..." when the body
    // has content.
    let include_title = !title.to_lowercase().starts_with("quick note ");
    if !first_line.is_empty() {
        if include_title {
            format!("{title} {first_line}").trim().to_string()
        } else {
            first_line.to_string()
        }
    } else if !title.is_empty() {
        title.to_string()
    } else {
        "[empty]".to_string()
    }
}

fn view_note(
    args: Vec<String>,
    session: &CliSession,
    ctx: &FormatContext,
    force_render: bool,
) -> Result<(), Box<dyn Error>> {
    let mut id: Option<i64> = None;
    let mut render = force_render;
    let mut plain = false;
    for arg in args {
        match arg.as_str() {
            "--render" | "-r" => render = true,
            "--plain" => plain = true,
            other => {
                if other.starts_with('-') {
                    return Err(format!("Unknown flag for view: {other}").into());
                }
                if id.is_none() {
                    id = Some(other.parse().map_err(|_| "Note id must be a number")?);
                }
            }
        }
    }
    let id = id.ok_or("Usage: cn view <id> [--render|-r] [--plain]")?;
    let note = session
        .find_note(id)
        .ok_or_else(|| format!("Note {id} not found"))?;

    let use_color = !plain && ctx.use_color;
    let body = if render {
        render::render_markdown(&note.body, &FormatContext::new(use_color))
    } else {
        note.body.clone()
    };
    let tags_line = if note.tags.is_empty() {
        String::new()
    } else {
        format!("Tags: {}\n", ctx.format_tag_list(&note.tags, &session.tag_colors))
    };
    println!(
        "# {} ({})\nCreated: {}\nUpdated: {}\n{}\n{}",
        note.title,
        note.id,
        note.created_at.format("%d%b%y %H:%M %:z"),
        note.updated_at.format("%d%b%y %H:%M %:z"),
        tags_line,
        body
    );
    Ok(())
}

fn edit_note(args: Vec<String>, session: &mut CliSession) -> Result<(), Box<dyn Error>> {
    let mut id: Option<i64> = None;
    let mut edit = NoteEdit::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--title" => edit.title = Some(require_value(&mut iter, "--title")?),
            "--body" => edit.body = Some(require_value(&mut iter, "--body")?),
            "--add-tag" => edit.add_tags.push(require_value(&mut iter, "--add-tag")?),
            "--remove-tag" => edit.remove_tags.push(require_value(&mut iter, "--remove-tag")?),
            other => {
                if other.starts_with('-') {
                    return Err(format!("Unknown flag for edit: {other}").into());
                }
                if id.is_none() {
                    id = Some(other.parse().map_err(|_| "Note id must be a number")?);
                }
            }
        }
    }
    let id = id.ok_or("Usage: cn edit <id> [--title T] [--body B] [--add-tag t] [--remove-tag t]")?;
    if edit.title.is_none()
        && edit.body.is_none()
        && edit.add_tags.is_empty()
        && edit.remove_tags.is_empty()
    {
        return Err("Provide at least one of --title/--body/--add-tag/--remove-tag".into());
    }

    match session.edit_note(id, edit) {
        Some(true) => println!("Updated {id}"),
        Some(false) => println!("No changes to {id}"),
        None => return Err(format!("Note {id} not found").into()),
    }
    Ok(())
}

fn require_value(
    iter: &mut std::vec::IntoIter<String>,
    flag: &str,
) -> Result<String, Box<dyn Error>> {
    iter.next()
        .ok_or_else(|| format!("Provide a value after {flag}").into())
}

fn delete_notes(args: Vec<String>, session: &mut CliSession) -> Result<(), Box<dyn Error>> {
    if args.is_empty() {
        return Err("Usage: cn delete <ids...>".into());
    }
    let mut ids = Vec::new();
    for arg in args {
        ids.push(arg.parse::<i64>().map_err(|_| format!("Invalid note id: {arg}"))?);
    }
    let deleted = session.delete_notes(&ids);
    if deleted == 0 {
        println!("No notes deleted.");
    } else {
        println!("Deleted {deleted} notes.");
    }
    Ok(())
}

fn list_tags(session: &mut CliSession, ctx: &FormatContext) {
    let entries = session.tag_library();
    if entries.is_empty() {
        println!("No tags yet. Try `cn tag new <name>` or tag a note.");
        return;
    }

    println!("{}", ctx.format_tag_table(&entries));
}

fn tag_command(mut args: Vec<String>, session: &mut CliSession) -> Result<(), Box<dyn Error>> {
    if args.is_empty() {
        return Err("Usage: cn tag <new|color|rm> ...".into());
    }
    let sub = args.remove(0);
    match sub.as_str() {
        "new" => {
            let name = args.first().ok_or("Usage: cn tag new <name>")?;
            match session.create_tag(name) {
                CreateTag::Created { color } => {
                    println!("Created tag {} ({})", name.trim(), color);
                }
                CreateTag::AlreadyExists => {
                    // Informational, not an error: the existing tag is the one
                    // the user wants.
                    println!("Tag {} already exists.", name.trim());
                }
                CreateTag::EmptyName => return Err("Tag name cannot be empty".into()),
            }
            Ok(())
        }
        "color" => {
            let name = args.first().cloned().ok_or("Usage: cn tag color <name> <hex>")?;
            let hex = args.get(1).cloned().ok_or("Usage: cn tag color <name> <hex>")?;
            if session.set_tag_color(&name, &hex) {
                println!(
                    "Set color of {} to {}",
                    name.trim(),
                    session.tag_colors[name.trim()]
                );
            } else {
                println!("Color of {} unchanged.", name.trim());
            }
            Ok(())
        }
        "rm" => {
            let mut confirmed = false;
            let mut name: Option<String> = None;
            for arg in args {
                if arg == "--yes" {
                    confirmed = true;
                } else if name.is_none() {
                    name = Some(arg);
                }
            }
            let name = name.ok_or("Usage: cn tag rm <name> --yes")?;
            if !confirmed {
                return Err(format!(
                    "Removing {} strips it from every note. Re-run with --yes to confirm.",
                    name.trim()
                )
                .into());
            }
            let (touched, map_changed) = session.delete_tag(&name);
            if touched == 0 && !map_changed {
                println!("Tag {} not found; nothing removed.", name.trim());
            } else {
                println!("Removed {} from {touched} notes.", name.trim());
            }
            Ok(())
        }
        other => Err(format!("Unknown tag subcommand: {other}").into()),
    }
}

fn palette_command(
    mut args: Vec<String>,
    session: &mut CliSession,
    ctx: &FormatContext,
) -> Result<(), Box<dyn Error>> {
    if args.is_empty() {
        list_palette(session, ctx);
        return Ok(());
    }
    let sub = args.remove(0);
    match sub.as_str() {
        "add" => {
            let hex = args.first().ok_or("Usage: cn palette add <hex>")?;
            if session.palette_add(hex) {
                println!("Saved color {}", color::normalize_hex(hex));
            } else {
                println!("Color {} already saved.", color::normalize_hex(hex));
            }
            Ok(())
        }
        "rm" => {
            let index: usize = args
                .first()
                .ok_or("Usage: cn palette rm <index>")?
                .parse()
                .map_err(|_| "Palette index must be a number")?;
            if session.palette_remove(index) {
                println!("Removed color at {index}.");
            } else {
                println!("No saved color at {index}.");
            }
            Ok(())
        }
        "clear" => {
            if !args.iter().any(|a| a == "--yes") {
                return Err("This forgets every saved color. Re-run with --yes to confirm.".into());
            }
            if session.palette_clear() {
                println!("Cleared saved colors.");
            } else {
                println!("No saved colors to clear.");
            }
            Ok(())
        }
        other => Err(format!("Unknown palette subcommand: {other}").into()),
    }
}

fn list_palette(session: &CliSession, ctx: &FormatContext) {
    if session.palette.is_empty() {
        println!("No saved colors. Try `cn palette add <hex>`.");
        return;
    }
    for (i, hex) in session.palette.colors().iter().enumerate() {
        println!("{i:2} {} {hex}", ctx.format_swatch(hex));
    }
}
