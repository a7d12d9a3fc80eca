//! AutoPXE iPXE Script Generation
//!
//! This crate provides an append-only builder for iPXE scripts and the
//! menu primitive used to render interactive boot menus.
//!
//! Nothing here validates the generated script: labels referenced by
//! `goto` or by menu items are the caller's responsibility.
//!
//! # Example
//!
//! ```
//! use autopxe_ipxe::{IpxeScript, Menu};
//!
//! let mut script = IpxeScript::new();
//! script.shebang().set("menu-timeout", "5000");
//!
//! let mut menu = Menu::new("start", "Boot menu").with_timeout("${menu-timeout}");
//! menu.add_item("Drop to iPXE shell", "shell");
//! menu.print_to(&mut script);
//!
//! let text = script.into_string();
//! assert!(text.starts_with("#!ipxe\n"));
//! assert!(text.contains("item shell Drop to iPXE shell\n"));
//! ```

pub mod menu;
pub mod script;

pub use menu::*;
pub use script::*;
