//! Boot menu composition
//!
//! Turns a [`Catalog`] into the iPXE script served for `autopxe-<mac>`:
//!
//! ```text
//! start                         main menu: one entry per distro
//! └── <distro>                  one entry per release
//!     └── <distro>/<release>    one entry per image and command line
//!         └── <distro>/<release>/<version>/<template>   boots it
//! ```
//!
//! The output depends only on the catalog, the config and the client
//! identity, so identical inputs give byte-identical scripts.

use crate::config::PipelineConfig;
use autopxe_catalog::{BootFile, Catalog, Distro, Release};
use autopxe_ipxe::{IpxeScript, Menu};
use std::collections::BTreeSet;
use std::net::IpAddr;

/// Label of the main menu
pub const MAIN_MENU: &str = "start";

/// Label every failed boot jumps to
pub const FAILED_LABEL: &str = "failed";

/// Variable holding the preselected entry
pub const MENU_DEFAULT_VAR: &str = "menu-default";

/// Variable holding the release root, referenced by command line templates
pub const ROOTFS_PATH_VAR: &str = "rootfs-path";

/// Fixed labels every script carries after the main menu
const COMMON_LABELS: &str = "\
:shell
echo Type 'exit' to get the back to the menu
shell
goto start

:failed
echo Booting failed, dropping to shell
goto shell

:reboot
reboot

:exit
exit

:config
config
goto start

";

fn release_id(distro: &Distro, release: &Release) -> String {
    format!("{}/{}", distro.name, release.name)
}

fn leaf_id(distro: &Distro, release: &Release, boot: &BootFile, template: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        distro.name,
        release.name,
        boot.version.raw(),
        template
    )
}

/// Builds boot scripts from a catalog
#[derive(Debug, Clone, Copy)]
pub struct MenuComposer<'a> {
    config: &'a PipelineConfig,
}

impl<'a> MenuComposer<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Every label a menu item may point at, for default resolution
    pub fn targets(&self, catalog: &Catalog) -> BTreeSet<String> {
        let mut targets = BTreeSet::new();
        for distro in catalog {
            targets.insert(distro.name.clone());
            for release in &distro.releases {
                targets.insert(release_id(distro, release));
                for boot in &release.boot_files {
                    for template in self.config.cmdline_templates.keys() {
                        targets.insert(leaf_id(distro, release, boot, template));
                    }
                }
            }
        }
        targets
    }

    /// Build the full script for one client
    pub fn compose(&self, catalog: &Catalog, mac: Option<&str>, ip: IpAddr) -> String {
        let mut script = IpxeScript::new();
        script.shebang();

        for (name, value) in &self.config.env {
            script.set(name, value);
        }

        let default = self
            .config
            .default_image_for(mac)
            .filter(|id| self.targets(catalog).contains(*id));
        if let Some(id) = default {
            script.set(MENU_DEFAULT_VAR, id);
        }

        self.main_menu(catalog, mac, ip, default).print_to(&mut script);
        script.append(COMMON_LABELS);

        for distro in catalog {
            self.distro_menu(distro).print_to(&mut script);
        }
        for distro in catalog {
            for release in &distro.releases {
                self.release_menu(distro, release).print_to(&mut script);
            }
        }
        for distro in catalog {
            for release in &distro.releases {
                for boot in &release.boot_files {
                    for (template, cmdline) in &self.config.cmdline_templates {
                        let id = leaf_id(distro, release, boot, template);
                        self.leaf(&mut script, &id, release, boot, cmdline);
                    }
                }
            }
        }

        script.into_string()
    }

    fn main_menu(
        &self,
        catalog: &Catalog,
        mac: Option<&str>,
        ip: IpAddr,
        default: Option<&str>,
    ) -> Menu {
        let title = format!(
            "AutoPXE Boot Main Menu {} {} ${{hostname}}",
            mac.unwrap_or("unknown"),
            ip
        );
        let mut menu = Menu::new(MAIN_MENU, title)
            .with_timeout(self.config.menu_timeout_ms.to_string())
            .with_cancel("shell");

        if let Some(id) = default {
            menu = menu.with_default(format!("${{{}}}", MENU_DEFAULT_VAR));
            menu.add_item(format!("Boot {}", id), id);
        }

        for distro in catalog {
            menu.add_item(distro.name.as_str(), distro.name.as_str());
        }

        menu.add_item("Configure settings", "config");
        menu.add_item("Drop to iPXE shell", "shell");
        menu.add_item("Reboot computer", "reboot");
        menu.add_item("Exit iPXE and continue BIOS boot", "exit");
        menu
    }

    fn distro_menu(&self, distro: &Distro) -> Menu {
        let mut menu =
            Menu::new(distro.name.as_str(), format!("Boot {}", distro.name)).with_cancel(MAIN_MENU);

        for release in &distro.releases {
            menu.add_item(release.name.as_str(), release_id(distro, release));
        }
        menu.add_item("Back to main menu", MAIN_MENU);
        menu
    }

    fn release_menu(&self, distro: &Distro, release: &Release) -> Menu {
        let id = release_id(distro, release);
        let mut menu =
            Menu::new(id.as_str(), format!("Boot {}", id)).with_cancel(distro.name.as_str());

        for boot in &release.boot_files {
            for template in self.config.cmdline_templates.keys() {
                let leaf = leaf_id(distro, release, boot, template);
                menu.add_item(format!("Boot {}", leaf), leaf);
            }
        }
        menu.add_item(format!("Back to {}", distro.name), distro.name.as_str());
        menu.add_item("Back to main menu", MAIN_MENU);
        menu
    }

    fn leaf(
        &self,
        script: &mut IpxeScript,
        id: &str,
        release: &Release,
        boot: &BootFile,
        cmdline: &str,
    ) {
        script
            .label(id)
            .set(ROOTFS_PATH_VAR, &release.rootfs_path)
            .echo(&format!("Booting {}", id))
            .echo(&format!("Cmdline: {}", cmdline))
            .line(&format!("initrd boot/{}", boot.initrd_path))
            .line("imgstat")
            .echo("Booting in 3 seconds...")
            .line("sleep 3")
            .line(&format!("chain boot/{} {}", boot.kernel_path, cmdline))
            .line(&format!("boot || goto {}", FAILED_LABEL));
    }
}
