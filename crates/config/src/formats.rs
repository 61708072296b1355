//! String format checks used by the configuration schema

use regex::Regex;
use std::net::IpAddr;
use std::path::{Component, Path};
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static HOST_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").expect("valid label regex")
});

static LICENSE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:DocumentRef-[A-Za-z0-9.-]+:)?LicenseRef-[A-Za-z0-9.-]+$")
        .expect("valid license ref regex")
});

/// SPDX identifiers accepted in license expressions
const SPDX_IDS: &[&str] = &[
    "0BSD",
    "AFL-3.0",
    "AGPL-1.0",
    "AGPL-3.0",
    "AGPL-3.0-only",
    "AGPL-3.0-or-later",
    "Apache-1.1",
    "Apache-2.0",
    "Artistic-2.0",
    "BSD-1-Clause",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "BSD-3-Clause-Clear",
    "BSL-1.0",
    "CC-BY-3.0",
    "CC-BY-4.0",
    "CC-BY-SA-4.0",
    "CC0-1.0",
    "CDDL-1.0",
    "CDDL-1.1",
    "ECL-2.0",
    "EPL-1.0",
    "EPL-2.0",
    "EUPL-1.1",
    "EUPL-1.2",
    "GPL-2.0",
    "GPL-2.0-only",
    "GPL-2.0-or-later",
    "GPL-3.0",
    "GPL-3.0-only",
    "GPL-3.0-or-later",
    "ISC",
    "LGPL-2.1",
    "LGPL-2.1-only",
    "LGPL-2.1-or-later",
    "LGPL-3.0",
    "LGPL-3.0-only",
    "LGPL-3.0-or-later",
    "MIT",
    "MIT-0",
    "MPL-1.1",
    "MPL-2.0",
    "MS-PL",
    "MS-RL",
    "NCSA",
    "OFL-1.1",
    "OSL-3.0",
    "PostgreSQL",
    "Unlicense",
    "UPL-1.0",
    "WTFPL",
    "Zlib",
];

const SPDX_EXCEPTIONS: &[&str] = &[
    "Autoconf-exception-3.0",
    "Bison-exception-2.2",
    "Classpath-exception-2.0",
    "GCC-exception-3.1",
    "LLVM-exception",
    "OpenJDK-assembly-exception-1.0",
];

pub fn is_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| u.has_host() || u.scheme() == "file")
        .unwrap_or(false)
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

pub fn is_version(value: &str) -> bool {
    semver::Version::parse(value).is_ok()
}

/// Domain name (RFC 1123 labels) or IPv4/IPv6 address
pub fn is_hostname(value: &str) -> bool {
    if value.parse::<IpAddr>().is_ok() {
        return true;
    }

    let name = value.strip_suffix('.').unwrap_or(value);
    if name.is_empty() || name.len() > 253 {
        return false;
    }

    name.split('.').all(|label| HOST_LABEL.is_match(label))
}

/// Absolute URL path such as `/api/v1`
pub fn is_abs_path(value: &str) -> bool {
    value.starts_with('/')
}

/// Exactly one plain path component: no separators, `.`, `..` or root
pub fn is_path_segment(value: &str) -> bool {
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(segment)), None) if segment == value
    )
}

/// Existing directory, relative paths resolved against `base_dir`
pub fn is_dir(base_dir: &Path, value: &str) -> bool {
    !value.is_empty() && base_dir.join(value).is_dir()
}

/// License usable by a newly published package
///
/// Accepts SPDX expressions built from known identifiers (optionally with a
/// trailing `+`), `LicenseRef-*` references, `WITH` exceptions, `AND`/`OR`
/// operators and parentheses, plus `UNLICENSED` and `SEE LICENSE IN <file>`.
pub fn is_license(value: &str) -> bool {
    let value = value.trim();
    if value == "UNLICENSED" || value == "UNLICENCED" {
        return true;
    }
    if let Some(file) = value.strip_prefix("SEE LICENSE IN ") {
        return !file.trim().is_empty();
    }

    let spaced = value.replace('(', " ( ").replace(')', " ) ");
    let tokens: Vec<&str> = spaced.split_whitespace().collect();
    if tokens.is_empty() {
        return false;
    }

    let mut depth = 0usize;
    let mut expect_operand = true;
    let mut after_with = false;

    for token in tokens {
        match token {
            "(" => {
                if !expect_operand {
                    return false;
                }
                depth += 1;
            }
            ")" => {
                if expect_operand || depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            "AND" | "OR" => {
                if expect_operand {
                    return false;
                }
                expect_operand = true;
            }
            "WITH" => {
                if expect_operand {
                    return false;
                }
                expect_operand = true;
                after_with = true;
            }
            operand => {
                if !expect_operand {
                    return false;
                }
                let known = if after_with {
                    SPDX_EXCEPTIONS.contains(&operand)
                } else {
                    is_license_id(operand)
                };
                if !known {
                    return false;
                }
                expect_operand = false;
                after_with = false;
            }
        }
    }

    depth == 0 && !expect_operand
}

fn is_license_id(token: &str) -> bool {
    let id = token.strip_suffix('+').unwrap_or(token);
    SPDX_IDS.contains(&id) || LICENSE_REF.is_match(id)
}
