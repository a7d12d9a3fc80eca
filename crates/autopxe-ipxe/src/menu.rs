//! iPXE menus
//!
//! A [`Menu`] renders as
//!
//! ```text
//! :<id>
//! menu <title>
//! item [<args> ]<target> <title>
//! choose [--timeout <t> ][--default <d> ]target-<id> || goto <cancel>
//! goto ${target-<id>}
//! ```
//!
//! Without a cancel target, cancelling jumps to a local `<id>-cancel` label
//! placed right after the menu, so execution continues with whatever the
//! caller appends next.

use crate::script::IpxeScript;

/// One `item` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub title: String,
    pub target: String,
    /// Extra `item` options such as `--key b` or `--gap --`
    pub args: Option<String>,
}

/// An iPXE `menu` with its `choose` dispatch
#[derive(Debug, Clone, Default)]
pub struct Menu {
    pub id: String,
    pub title: String,
    pub items: Vec<MenuItem>,
    /// Milliseconds, or an iPXE variable reference
    pub timeout: Option<String>,
    pub default: Option<String>,
    pub cancel: Option<String>,
}

impl Menu {
    /// Create a menu labelled `id`
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the selection timeout
    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// Set the item selected when the timeout expires
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the label to jump to when the user cancels
    pub fn with_cancel(mut self, cancel: impl Into<String>) -> Self {
        self.cancel = Some(cancel.into());
        self
    }

    /// Add an item jumping to `target`
    pub fn add_item(&mut self, title: impl Into<String>, target: impl Into<String>) {
        self.items.push(MenuItem {
            title: title.into(),
            target: target.into(),
            args: None,
        });
    }

    /// Add an item with extra `item` options
    pub fn add_item_with_args(
        &mut self,
        title: impl Into<String>,
        target: impl Into<String>,
        args: impl Into<String>,
    ) {
        self.items.push(MenuItem {
            title: title.into(),
            target: target.into(),
            args: Some(args.into()),
        });
    }

    /// Label of the generated cancel fall-through
    fn cancel_label(&self) -> String {
        format!("{}-cancel", self.id)
    }

    /// Render the menu into `script`
    pub fn print_to(&self, script: &mut IpxeScript) {
        script.label(&self.id);
        script.line(&format!("menu {}", self.title));

        for item in &self.items {
            match item.args {
                Some(ref args) => {
                    script.line(&format!("item {} {} {}", args, item.target, item.title))
                }
                None => script.line(&format!("item {} {}", item.target, item.title)),
            };
        }

        let mut choose = String::from("choose ");
        if let Some(ref timeout) = self.timeout {
            choose.push_str(&format!("--timeout {} ", timeout));
        }
        if let Some(ref default) = self.default {
            choose.push_str(&format!("--default {} ", default));
        }
        let cancel = self.cancel.clone().unwrap_or_else(|| self.cancel_label());
        choose.push_str(&format!("target-{} || goto {}", self.id, cancel));

        script.line(&choose);
        script.goto(&format!("${{target-{}}}", self.id));

        if self.cancel.is_none() {
            script.label(&self.cancel_label());
        }
    }
}
