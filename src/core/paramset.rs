use super::lentil::Float;
use std::cell::Cell;
use std::fmt;

#[derive(Debug, Default, Clone)]
pub struct ParamSetItem<T> {
    pub name: String,
    pub values: Vec<T>,
    pub looked_up: Cell<bool>
}

impl<T> ParamSetItem<T> {
    pub fn from_vec(name: &str, values: Vec<T>) -> ParamSetItem<T> {
        ParamSetItem {
            name: name.to_owned(),
            values,
            looked_up: Cell::new(false)
        }
    }
}

/// Typed parameter lists read from a lens profile file.
#[derive(Debug, Default, Clone)]
pub struct ParamSet {
    pub bools: Vec<ParamSetItem<bool>>,
    pub ints: Vec<ParamSetItem<i32>>,
    pub floats: Vec<ParamSetItem<Float>>,
    pub strings: Vec<ParamSetItem<String>>,
}

fn erase<T>(items: &mut Vec<ParamSetItem<T>>, name: &str) {
    items.retain(|item| item.name != name);
}

fn find_one<T: Clone>(items: &[ParamSetItem<T>], name: &str) -> Option<T> {
    items.iter()
        .find(|item| item.name == name && item.values.len() == 1)
        .map(|item| {
            item.looked_up.set(true);
            item.values[0].clone()
        })
}

fn find<'a, T>(items: &'a [ParamSetItem<T>], name: &str) -> Option<&'a [T]> {
    items.iter()
        .find(|item| item.name == name)
        .map(|item| {
            item.looked_up.set(true);
            item.values.as_slice()
        })
}

impl ParamSet {
    pub fn new() -> ParamSet {
        ParamSet::default()
    }

    pub fn add_float(&mut self, name: &str, values: Vec<Float>) {
        erase(&mut self.floats, name);
        self.floats.push(ParamSetItem::from_vec(name, values));
    }

    pub fn add_int(&mut self, name: &str, values: Vec<i32>) {
        erase(&mut self.ints, name);
        self.ints.push(ParamSetItem::from_vec(name, values));
    }

    pub fn add_bool(&mut self, name: &str, values: Vec<bool>) {
        erase(&mut self.bools, name);
        self.bools.push(ParamSetItem::from_vec(name, values));
    }

    pub fn add_string(&mut self, name: &str, values: Vec<String>) {
        erase(&mut self.strings, name);
        self.strings.push(ParamSetItem::from_vec(name, values));
    }

    pub fn find_one_float(&self, name: &str, d: Float) -> Float {
        find_one(&self.floats, name).unwrap_or(d)
    }

    pub fn find_one_int(&self, name: &str, d: i32) -> i32 {
        find_one(&self.ints, name).unwrap_or(d)
    }

    pub fn find_one_bool(&self, name: &str, d: bool) -> bool {
        find_one(&self.bools, name).unwrap_or(d)
    }

    pub fn find_one_string(&self, name: &str, d: &str) -> String {
        find_one(&self.strings, name).unwrap_or_else(|| d.to_owned())
    }

    pub fn find_string(&self, name: &str) -> Option<&[String]> {
        find(&self.strings, name)
    }

    /// Names of parameters nobody looked up.
    pub fn unused(&self) -> Vec<&str> {
        fn collect<'a, T>(items: &'a [ParamSetItem<T>], out: &mut Vec<&'a str>) {
            out.extend(items.iter().filter(|v| !v.looked_up.get()).map(|v| v.name.as_str()));
        }
        let mut out = Vec::new();
        collect(&self.ints, &mut out);
        collect(&self.bools, &mut out);
        collect(&self.floats, &mut out);
        collect(&self.strings, &mut out);
        out
    }

    pub fn report_unused(&self) {
        for name in self.unused() {
            warn!("Parameter \"{}\" not used", name);
        }
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.ints {
            write!(f, "\"integer {}\" [ {} ] ", item.name,
                item.values.iter().map(|v| v.to_string()).collect::<Vec<String>>().join(" "))?;
        }
        for item in &self.bools {
            write!(f, "\"bool {}\" [ {} ] ", item.name,
                item.values.iter().map(|v| format!("\"{}\"", v)).collect::<Vec<String>>().join(" "))?;
        }
        for item in &self.floats {
            write!(f, "\"float {}\" [ {} ] ", item.name,
                item.values.iter().map(|v| v.to_string()).collect::<Vec<String>>().join(" "))?;
        }
        for item in &self.strings {
            write!(f, "\"string {}\" [ {} ] ", item.name,
                item.values.iter().map(|v| format!("\"{}\"", v)).collect::<Vec<String>>().join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_one_marks_looked_up() {
        let mut ps = ParamSet::new();
        ps.add_float("sensor_width", vec![24.0]);
        ps.add_int("vignetting_retries", vec![3]);
        assert_eq!(ps.find_one_float("sensor_width", 36.0), 24.0);
        assert_eq!(ps.unused(), vec!["vignetting_retries"]);
    }

    #[test]
    fn defaults_when_missing_or_not_single() {
        let mut ps = ParamSet::new();
        ps.add_float("pair", vec![1.0, 2.0]);
        assert_eq!(ps.find_one_float("pair", 5.0), 5.0);
        assert_eq!(ps.find_one_bool("enable_dof", true), true);
        assert_eq!(ps.find_one_string("units", "cm"), "cm");
        assert_eq!(ps.unused(), vec!["pair"]);
    }

    #[test]
    fn add_replaces_existing() {
        let mut ps = ParamSet::new();
        ps.add_string("units", vec!["mm".to_owned()]);
        ps.add_string("units", vec!["m".to_owned()]);
        assert_eq!(ps.strings.len(), 1);
        assert_eq!(ps.find_one_string("units", "cm"), "m");
        assert_eq!(ps.find_string("units"), Some(&["m".to_owned()][..]));
    }
}
