//! studyflow theme command implementation.

use serde::Serialize;

use crate::app::App;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::theme::{Palette, Theme};

pub enum ThemeAction {
    Show,
    Toggle,
    Set(Theme),
}

pub struct ThemeOptions {
    pub action: ThemeAction,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct ThemeOutput {
    theme: Theme,
    palette: Palette,
}

pub fn run(mut app: App, options: ThemeOptions) -> Result<()> {
    let (command, theme) = match options.action {
        ThemeAction::Show => ("theme show", app.theme().current()),
        ThemeAction::Toggle => ("theme toggle", app.theme_mut().toggle()),
        ThemeAction::Set(theme) => ("theme set", app.theme_mut().set(theme)),
    };

    let output = ThemeOutput {
        theme,
        palette: theme.palette(),
    };

    let mut human = HumanOutput::new(format!("Theme: {theme}"));
    human.push_summary("Background", output.palette.background);
    human.push_summary("Text", output.palette.text);
    human.push_summary("Primary", output.palette.primary);
    human.push_notifications(app.drain_notifications());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        command,
        &output,
        Some(&human),
    )
}
