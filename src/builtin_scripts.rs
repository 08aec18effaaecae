//! Example scripts shipped inside the binary.

/// An embedded script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinScript {
    pub name: &'static str,
    pub code: &'static str,
}

// Sorted by name
const BUILTIN_SCRIPTS: &[BuiltinScript] = &[
    BuiltinScript {
        name: "Countdown.lua",
        code: include_str!("../scripts/builtin/Countdown.lua"),
    },
    BuiltinScript {
        name: "Fibonacci.lua",
        code: include_str!("../scripts/builtin/Fibonacci.lua"),
    },
    BuiltinScript {
        name: "HelloWorld.lua",
        code: include_str!("../scripts/builtin/HelloWorld.lua"),
    },
];

pub fn list() -> &'static [BuiltinScript] {
    BUILTIN_SCRIPTS
}

/// Look up a built-in script by file name (case-insensitive)
pub fn get(name: &str) -> Option<&'static BuiltinScript> {
    BUILTIN_SCRIPTS
        .iter()
        .find(|script| script.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_is_sorted_by_name() {
        let names: Vec<_> = list().iter().map(|script| script.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_get_is_case_insensitive() {
        assert_eq!(get("helloworld.LUA").map(|s| s.name), Some("HelloWorld.lua"));
        assert!(get("Missing.lua").is_none());
    }

    #[test]
    fn test_builtin_scripts_are_not_empty() {
        for script in list() {
            assert!(!script.code.trim().is_empty(), "{} is empty", script.name);
            assert!(script.name.ends_with(".lua"));
        }
    }
}
