//! One-shot commands operating on the tracker directly.

use std::{io::Write, sync::Arc};

use desktop_tracker::{DesktopSettings, DesktopTracker, SpaceHost, SpaceId};
use prefs::PrefsStore;

use crate::{
    cli::{SetArgs, SettingsArgs},
    error::{Error, Result},
};

/// Shared inputs for one-shot commands.
pub struct Context {
    /// Host session.
    pub host: Arc<dyn SpaceHost>,
    /// Preferences store.
    pub store: Arc<dyn PrefsStore>,
}

impl Context {
    fn tracker(&self) -> Result<DesktopTracker> {
        Ok(DesktopTracker::initialize(
            self.host.clone(),
            self.store.clone(),
        )?)
    }
}

/// `current`: active Space and name, tab separated.
pub fn current(ctx: &Context, out: &mut dyn Write) -> Result<()> {
    let tracker = ctx.tracker()?;
    let id = tracker.current();
    if id.space.is_unknown() {
        return Err(Error::NoActiveSpace);
    }
    writeln!(out, "{}\t{}", id.space, id.name)?;
    Ok(())
}

/// `list`: named Spaces in key order, the active one marked with `*`.
pub fn list(ctx: &Context, out: &mut dyn Write) -> Result<()> {
    let tracker = ctx.tracker()?;
    let entries = tracker.list_all();
    if entries.is_empty() {
        writeln!(out, "No custom desktop names configured")?;
        return Ok(());
    }
    let width = entries
        .iter()
        .map(|e| e.space.key().len())
        .max()
        .unwrap_or(0);
    for e in entries {
        let mark = if e.space == tracker.current_space() {
            '*'
        } else {
            ' '
        };
        writeln!(out, "{mark} {:<width$}  {}", e.space.key(), e.name, width = width)?;
    }
    Ok(())
}

/// `set`: name a Space, defaulting to the active one.
pub fn set(ctx: &Context, args: &SetArgs, out: &mut dyn Write) -> Result<()> {
    let mut tracker = ctx.tracker()?;
    let space = match args.space {
        Some(raw) => SpaceId::new(raw),
        None if !tracker.current_space().is_unknown() => tracker.current_space(),
        None => return Err(Error::NoActiveSpace),
    };
    tracker.set_name(&args.name, space)?;
    writeln!(out, "{}\t{}", space, args.name)?;
    Ok(())
}

/// `remove`: drop a Space's name. Absent names are not an error.
pub fn remove(ctx: &Context, space: u64, out: &mut dyn Write) -> Result<()> {
    let mut tracker = ctx.tracker()?;
    tracker.remove_name(SpaceId::new(space))?;
    writeln!(out, "removed {space}")?;
    Ok(())
}

/// `settings`: apply any requested changes, then print the settings.
pub fn settings(ctx: &Context, args: &SettingsArgs, out: &mut dyn Write) -> Result<()> {
    let mut s = DesktopSettings::load(ctx.store.as_ref())?;
    if args.has_changes() {
        if let Some(v) = args.show_name {
            s.show_desktop_name = v;
        }
        if let Some(v) = args.auto_expand {
            s.auto_expand_on_notch = v;
        }
        if let Some(v) = args.delay {
            s.set_auto_hide_delay(v);
        }
        s.save(ctx.store.as_ref())?;
    }
    writeln!(out, "show desktop name: {}", s.show_desktop_name)?;
    writeln!(
        out,
        "auto-expand on notch: {}{}",
        s.auto_expand_on_notch,
        if s.auto_expand_on_notch && !s.show_desktop_name {
            " (inactive: name hidden)"
        } else {
            ""
        }
    )?;
    writeln!(out, "auto-hide delay: {:.1} seconds", s.auto_hide_delay_secs())?;
    Ok(())
}
