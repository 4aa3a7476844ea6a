//! Semantic process categories from a fixed rule table.
//!
//! Rules match on the display name (exact or prefix) and on the bundle
//! identifier prefix, case-insensitively. The first matching rule wins;
//! configured rules are consulted before the built-in table.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    System,
    Browser,
    Development,
    Communication,
    Utility,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::System,
        Category::Browser,
        Category::Development,
        Category::Communication,
        Category::Utility,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::System => "System",
            Category::Browser => "Browser",
            Category::Development => "Development",
            Category::Communication => "Communication",
            Category::Utility => "Utility",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub name_prefixes: Vec<String>,
    #[serde(default)]
    pub bundle_prefixes: Vec<String>,
}

impl CategoryRule {
    fn from_static(
        category: Category,
        names: &[&str],
        name_prefixes: &[&str],
        bundle_prefixes: &[&str],
    ) -> Self {
        let owned =
            |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        CategoryRule {
            category,
            names: owned(names),
            name_prefixes: owned(name_prefixes),
            bundle_prefixes: owned(bundle_prefixes),
        }
    }

    fn normalized(mut self) -> Self {
        for list in [
            &mut self.names,
            &mut self.name_prefixes,
            &mut self.bundle_prefixes,
        ] {
            for item in list.iter_mut() {
                *item = item.to_lowercase();
            }
        }
        self
    }

    /// Both inputs must already be lowercase.
    fn matches(&self, name: &str, bundle_identifier: Option<&str>) -> bool {
        if let Some(bundle) = bundle_identifier
            && self.bundle_prefixes.iter().any(|p| bundle.starts_with(p.as_str()))
        {
            return true;
        }
        self.names.iter().any(|n| n == name)
            || self.name_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

// Order matters: specific vendors come before the catch-all "com.apple." rule.
fn builtin_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::from_static(
            Category::Browser,
            &[
                "safari",
                "google chrome",
                "chrome",
                "chromium",
                "firefox",
                "arc",
                "brave browser",
                "microsoft edge",
                "msedge",
                "opera",
                "vivaldi",
            ],
            &["google chrome helper", "firefox-", "chrome_crashpad"],
            &[
                "com.apple.safari",
                "com.google.chrome",
                "org.chromium.",
                "org.mozilla.firefox",
                "company.thebrowser.",
                "com.brave.browser",
                "com.microsoft.edgemac",
                "com.operasoftware.",
                "com.vivaldi.",
            ],
        ),
        CategoryRule::from_static(
            Category::Development,
            &[
                "xcode",
                "code",
                "cursor",
                "terminal",
                "iterm2",
                "alacritty",
                "kitty",
                "wezterm",
                "git",
                "cargo",
                "rustc",
                "rust-analyzer",
                "node",
                "java",
                "docker",
                "dockerd",
                "containerd",
                "clang",
                "lldb",
                "gdb",
                "make",
                "gopls",
                "nvim",
                "vim",
            ],
            &["python", "code helper", "com.docker."],
            &[
                "com.apple.dt.",
                "com.apple.terminal",
                "com.microsoft.vscode",
                "com.jetbrains.",
                "com.googlecode.iterm2",
                "com.docker.",
                "dev.warp.",
                "io.alacritty",
                "net.kovidgoyal.kitty",
                "com.github.wez.wezterm",
                "com.todesktop.",
            ],
        ),
        CategoryRule::from_static(
            Category::Communication,
            &[
                "slack",
                "discord",
                "zoom.us",
                "teams",
                "microsoft teams",
                "messages",
                "mail",
                "telegram",
                "signal",
                "whatsapp",
                "thunderbird",
            ],
            &["slack helper", "discord helper"],
            &[
                "com.tinyspeck.slackmacgap",
                "com.hnc.discord",
                "us.zoom.",
                "com.microsoft.teams",
                "com.apple.mobilesms",
                "com.apple.mail",
                "ru.keepcoder.telegram",
                "org.whispersystems.signal-desktop",
                "net.whatsapp.",
                "org.mozilla.thunderbird",
            ],
        ),
        CategoryRule::from_static(
            Category::Utility,
            &[
                "activity monitor",
                "htop",
                "btop",
                "top",
                "1password",
                "dropbox",
                "raycast",
                "alfred",
                "rectangle",
                "preview",
                "textedit",
                "calculator",
                "procscope",
            ],
            &[],
            &[
                "com.apple.activitymonitor",
                "com.apple.preview",
                "com.apple.textedit",
                "com.apple.calculator",
                "com.raycast.",
                "com.runningwithcrayons.alfred",
                "com.1password.",
                "com.agilebits.",
                "com.getdropbox.",
                "com.knollsoft.rectangle",
            ],
        ),
        CategoryRule::from_static(
            Category::System,
            &[
                "kernel_task",
                "launchd",
                "windowserver",
                "loginwindow",
                "finder",
                "dock",
                "systemuiserver",
                "controlcenter",
                "coreaudiod",
                "bluetoothd",
                "cfprefsd",
                "distnoted",
                "syslogd",
                "logd",
                "notifyd",
                "configd",
                "opendirectoryd",
                "mds",
                "mds_stores",
                "init",
                "systemd",
                "kthreadd",
                "dbus-daemon",
                "dbus-broker",
                "sshd",
                "cron",
                "rsyslogd",
                "networkmanager",
                "xorg",
                "gnome-shell",
                "polkitd",
            ],
            &[
                "mdworker",
                "com.apple.",
                "systemd-",
                "kworker",
                "ksoftirqd",
                "migration",
                "rcu_",
                "irq_",
            ],
            &["com.apple."],
        ),
    ]
}

#[derive(Clone, Debug)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Categorizer {
    /// `extra` rules take precedence over the built-in table.
    pub fn new(extra: Vec<CategoryRule>) -> Self {
        let rules = extra
            .into_iter()
            .chain(builtin_rules())
            .map(CategoryRule::normalized)
            .collect();
        Categorizer { rules }
    }

    pub fn categorize(&self, name: &str, bundle_identifier: Option<&str>) -> Category {
        let name = name.to_lowercase();
        let bundle = bundle_identifier.map(str::to_lowercase);
        self.rules
            .iter()
            .find(|rule| rule.matches(&name, bundle.as_deref()))
            .map(|rule| rule.category)
            .unwrap_or(Category::Other)
    }
}
