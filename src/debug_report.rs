use dialwise::{AbbreviatedDial, BuildMetrics, DaTree, Leaf, LookupResult, Pattern, PatternKind, Visibility};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_build(metrics: &BuildMetrics, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.paint("━━━ Dial plan ━━━", ansi::GRAY));
    for kind in PatternKind::ALL {
        let kind_metrics = metrics.kind(kind);
        println!(
            "  {}  {}  {}",
            palette.paint(format!("{:<2}", kind.short_name()), ansi::BLUE),
            palette.bold(format!("{:>6}", kind_metrics.inserted)),
            palette.dim(format!("{:?}", kind_metrics.duration)),
        );
    }
    println!(
        "  Nodes: {}  │  Total: {}",
        palette.paint(metrics.nodes.to_string(), ansi::CYAN),
        palette.paint(format!("{:?}", metrics.total), ansi::GREEN),
    );
    for skipped in &metrics.skipped {
        println!(
            "  {} #{} {} {}",
            palette.paint("skipped", ansi::YELLOW),
            skipped.index,
            palette.bold(&skipped.text),
            palette.dim(skipped.error.to_string()),
        );
    }
}

pub fn print_lookup(digits: &str, visibility: &Visibility, result: &LookupResult<'_>, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("☎  Dialing: \"{digits}\" [{visibility}]"), ansi::CYAN)));

    if !result.hops.is_empty() {
        println!("\n{}", palette.paint("━━━ Translations ━━━", ansi::GRAY));
        for hop in &result.hops {
            println!(
                "  {}{} {} {} {} {}",
                "  ".repeat(hop.depth),
                palette.paint(&hop.from, ansi::YELLOW),
                palette.dim("→"),
                palette.bold(palette.paint(&hop.to, ansi::GREEN)),
                palette.dim(format!("[{}]", hop.visibility)),
                palette.dim(format!("via {}", fmt_rule(hop.rule, &palette))),
            );
        }
    }

    println!("\n{}", palette.paint("━━━ Results ━━━", ansi::GRAY));
    if result.patterns.is_empty() {
        println!("{}", palette.dim("  No match"));
    }
    for (idx, pattern) in result.patterns.iter().enumerate() {
        println!("  {} {}", palette.paint(format!("[{idx}]"), ansi::GRAY), fmt_pattern(pattern, &palette));
    }
    for rule in &result.exhausted {
        println!(
            "  {} {}",
            palette.paint("depth limit", ansi::YELLOW),
            palette.dim(format!("{rule} was matched but not applied")),
        );
    }
    for failure in &result.failures {
        println!(
            "  {} {} on {}: {}",
            palette.paint("failed", ansi::RED),
            failure.rule,
            palette.bold(&failure.digits),
            palette.dim(failure.error.to_string()),
        );
    }
    println!();
}

pub fn print_leaves(tree: &DaTree, leaves: &[Leaf], color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.paint(format!("━━━ Reachable ({}) ━━━", leaves.len()), ansi::GRAY));
    for leaf in leaves {
        let node = tree.node(leaf.node);
        let terminals: Vec<String> =
            node.terminal_patterns.values().map(|id| tree.pattern(*id).to_string()).collect();
        println!(
            "  {} {} {}",
            palette.bold(palette.paint(&leaf.dial_string, ansi::GREEN)),
            palette.dim(format!("({})", node.pattern_types)),
            palette.paint(terminals.join(", "), ansi::BLUE),
        );
    }
}

pub fn print_abbreviated(dials: &[AbbreviatedDial<'_>], color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.paint("━━━ Abbreviated dialing ━━━", ansi::GRAY));
    if dials.is_empty() {
        println!("{}", palette.dim("  No translation rules reachable"));
    }
    for dial in dials {
        let rules: Vec<String> = dial.rules.iter().map(|rule| fmt_rule(rule, &palette)).collect();
        println!(
            "  {} {} {}",
            palette.bold(palette.paint(&dial.dial_string, ansi::YELLOW)),
            palette.dim("via"),
            rules.join(", "),
        );
        match &dial.outcome {
            Ok(result) if result.patterns.is_empty() => println!("      {}", palette.dim("no match")),
            Ok(result) => {
                for pattern in &result.patterns {
                    println!("      {} {}", palette.dim("→"), fmt_pattern(pattern, &palette));
                }
            }
            Err(error) => println!("      {}", palette.paint(error.to_string(), ansi::RED)),
        }
    }
    println!();
}

fn fmt_pattern(pattern: &Pattern, palette: &ansi::Palette) -> String {
    format!(
        "{} {}",
        palette.bold(palette.paint(pattern.text_and_partition(), ansi::GREEN)),
        palette.paint(pattern.kind().short_name(), ansi::BLUE),
    )
}

fn fmt_rule(rule: &Pattern, palette: &ansi::Palette) -> String {
    if rule.translation_rule().is_some_and(|rule| rule.blocking) {
        format!("{rule} {}", palette.paint("blocking", ansi::RED))
    } else {
        rule.to_string()
    }
}
