//! robots.txt parser (SPEC_FULL.md §4.J): line-oriented, tracks the active
//! user-agent group and keeps only rules that apply to the wildcard group.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRules {
    pub disallow: Vec<String>,
    pub sitemaps: Vec<String>,
}

pub fn parse_robots(text: &str) -> RobotsRules {
    let mut rules = RobotsRules::default();
    let mut in_wildcard_group = false;

    for raw_line in text.lines() {
        let line = match raw_line.find('#') {
            Some(pos) => &raw_line[..pos],
            None => raw_line,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((directive, value)) = line.split_once(':') else { continue };
        let directive = directive.trim().to_ascii_lowercase();
        let value = value.trim();

        match directive.as_str() {
            "user-agent" => in_wildcard_group = value == "*",
            "disallow" if in_wildcard_group && !value.is_empty() => rules.disallow.push(value.to_string()),
            "sitemap" => rules.sitemaps.push(value.to_string()),
            _ => {}
        }
    }

    rules
}

pub fn is_allowed(path: &str, disallow: &[String]) -> bool {
    !disallow.iter().any(|rule| path.starts_with(rule.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_group_disallow_rules_are_collected() {
        let text = "User-agent: *\nDisallow: /admin\nDisallow: /private\n";
        let rules = parse_robots(text);
        assert_eq!(rules.disallow, vec!["/admin", "/private"]);
    }

    #[test]
    fn rules_outside_wildcard_group_are_ignored() {
        let text = "User-agent: Googlebot\nDisallow: /admin\nUser-agent: *\nDisallow: /private\n";
        let rules = parse_robots(text);
        assert_eq!(rules.disallow, vec!["/private"]);
    }

    #[test]
    fn sitemap_directives_are_collected_regardless_of_group() {
        let text = "User-agent: Googlebot\nSitemap: https://example.com/sitemap.xml\nUser-agent: *\nDisallow: /x\n";
        let rules = parse_robots(text);
        assert_eq!(rules.sitemaps, vec!["https://example.com/sitemap.xml"]);
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let text = "# comment\nUser-agent: *\n\nDisallow: /admin # trailing comment\n";
        let rules = parse_robots(text);
        assert_eq!(rules.disallow, vec!["/admin"]);
    }

    #[test]
    fn is_allowed_true_when_no_rule_is_a_prefix() {
        assert!(is_allowed("/public", &["/admin".to_string()]));
        assert!(!is_allowed("/admin/secret", &["/admin".to_string()]));
    }

    #[test]
    fn empty_disallow_list_always_allows() {
        assert!(is_allowed("/anything", &[]));
    }
}
