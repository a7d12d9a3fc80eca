//! iPXE script accumulator
//!
//! Every helper appends one line terminated by `\n`. The builder keeps no
//! state besides the text itself, so the same sequence of calls always
//! yields the same bytes.

/// First line of every iPXE script
pub const SHEBANG: &str = "#!ipxe";

/// Append-only iPXE script text
#[derive(Debug, Clone, Default)]
pub struct IpxeScript {
    script: String,
}

impl IpxeScript {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw text as-is
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.script.push_str(text);
        self
    }

    /// Append one line
    pub fn line(&mut self, line: &str) -> &mut Self {
        self.script.push_str(line);
        self.script.push('\n');
        self
    }

    /// `#!ipxe`
    pub fn shebang(&mut self) -> &mut Self {
        self.line(SHEBANG)
    }

    /// `set <name> <value>`
    pub fn set(&mut self, name: &str, value: &str) -> &mut Self {
        self.line(&format!("set {} {}", name, value))
    }

    /// `:<label>`
    pub fn label(&mut self, label: &str) -> &mut Self {
        self.line(&format!(":{}", label))
    }

    /// `goto <label>`
    pub fn goto(&mut self, label: &str) -> &mut Self {
        self.line(&format!("goto {}", label))
    }

    /// `echo <text>`
    pub fn echo(&mut self, text: &str) -> &mut Self {
        self.line(&format!("echo {}", text))
    }

    /// `# <text>`
    pub fn comment(&mut self, text: &str) -> &mut Self {
        self.line(&format!("# {}", text))
    }

    /// Empty line
    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Consume the builder and return the script text
    pub fn into_string(self) -> String {
        self.script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_emit_lines() {
        let mut script = IpxeScript::new();
        script
            .shebang()
            .set("nfs-server", "172.25.2.10")
            .label("start")
            .echo("Hello")
            .comment("generated")
            .goto("start");

        assert_eq!(
            script.into_string(),
            "#!ipxe\nset nfs-server 172.25.2.10\n:start\necho Hello\n# generated\ngoto start\n"
        );
    }

    #[test]
    fn test_append_is_lossless() {
        let mut script = IpxeScript::new();
        script.append("dhcp").append("\n").append(":shell\nshell\n").blank();

        assert_eq!(script.into_string(), "dhcp\n:shell\nshell\n\n");
    }

    #[test]
    fn test_same_calls_same_bytes() {
        let build = || {
            let mut script = IpxeScript::new();
            script.shebang().set("a", "1").label("x").echo("y");
            script.into_string()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_empty_script() {
        assert_eq!(IpxeScript::new().into_string(), "");
    }
}
