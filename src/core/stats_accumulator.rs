//! Process-wide statistics for the ray tracer.
//!
//! Sampling threads report values through lock-free channels; the totals are only
//! touched when `accumulate` drains the channels, normally once after a render.

use crossbeam_channel::{unbounded, Receiver, Sender};
use hashbrown::HashMap;
use parking_lot::Mutex;
use std::io::{self, Write};

lazy_static! {
    static ref STATS: StatsAccumulator = StatsAccumulator::new();
}

#[derive(Default)]
struct Totals {
    counters: HashMap<String, i64>,
    // value is (sum, count, min, max)
    int_distributions: HashMap<String, (i64, i64, i64, i64)>,
    percentages: HashMap<String, (i64, i64)>,
}

pub struct StatsAccumulator {
    r_counter: Receiver<(String, i64)>,
    s_counter: Sender<(String, i64)>,
    r_int_distribution: Receiver<(String, i64)>,
    s_int_distribution: Sender<(String, i64)>,
    r_percentage: Receiver<(String, i64, i64)>,
    s_percentage: Sender<(String, i64, i64)>,

    totals: Mutex<Totals>,
}

impl StatsAccumulator {
    pub fn new() -> StatsAccumulator {
        let (s_counter, r_counter) = unbounded::<(String, i64)>();
        let (s_int_distribution, r_int_distribution) = unbounded::<(String, i64)>();
        let (s_percentage, r_percentage) = unbounded::<(String, i64, i64)>();

        StatsAccumulator {
            r_counter,
            s_counter,
            r_int_distribution,
            s_int_distribution,
            r_percentage,
            s_percentage,
            totals: Mutex::new(Totals::default()),
        }
    }

    /// Returns the shared instance.
    pub fn instance() -> &'static StatsAccumulator {
        &STATS
    }

    // The receivers live as long as the senders, so a send can only fail during
    // teardown; the value is dropped then.
    pub fn report_counter(&self, name: &str, val: i64) {
        let _ = self.s_counter.send((name.to_owned(), val));
    }

    pub fn report_int_distribution(&self, name: &str, val: i64) {
        let _ = self.s_int_distribution.send((name.to_owned(), val));
    }

    pub fn report_percentage(&self, name: &str, num: i64, denom: i64) {
        let _ = self.s_percentage.send((name.to_owned(), num, denom));
    }

    /// Drain every pending report into the totals.
    pub fn accumulate(&self) {
        let mut totals = self.totals.lock();

        for (name, val) in self.r_counter.try_iter() {
            *totals.counters.entry(name).or_default() += val;
        }

        for (name, val) in self.r_int_distribution.try_iter() {
            let distribution = totals.int_distributions
                .entry(name)
                .or_insert((0, 0, i64::max_value(), i64::min_value()));
            distribution.0 += val;
            distribution.1 += 1;
            distribution.2 = val.min(distribution.2);
            distribution.3 = val.max(distribution.3);
        }

        for (name, num, denom) in self.r_percentage.try_iter() {
            let percentage = totals.percentages.entry(name).or_default();
            percentage.0 += num;
            percentage.1 += denom;
        }
    }

    pub fn counter(&self, name: &str) -> i64 {
        self.totals.lock().counters.get(name).cloned().unwrap_or(0)
    }

    /// Returns `(num, denom)` for a percentage statistic.
    pub fn percentage(&self, name: &str) -> (i64, i64) {
        self.totals.lock().percentages.get(name).cloned().unwrap_or((0, 0))
    }

    pub fn print<T: Write>(&self, dest: &mut T) -> io::Result<()> {
        let totals = self.totals.lock();
        let mut to_print: HashMap<String, Vec<String>> = HashMap::default();

        for (counter, value) in &totals.counters {
            let (category, title) = get_category_and_title(counter);
            to_print.entry(category.into()).or_default().push(format!("{:<42}               {:12}", title, value));
        }

        for (counter, value) in &totals.int_distributions {
            if value.1 == 0 {
                continue;
            }
            let (category, title) = get_category_and_title(counter);
            let avg = value.0 as f64 / value.1 as f64;
            to_print.entry(category.into()).or_default().push(format!("{:<42}                      {:.3} avg [range {} - {}]", title, avg, value.2, value.3));
        }

        for (counter, value) in &totals.percentages {
            if value.1 == 0 {
                continue;
            }
            let (category, title) = get_category_and_title(counter);
            let percent = value.0 as f64 * 100.0 / value.1 as f64;
            to_print.entry(category.into()).or_default().push(format!("{:<42}{:12} {:12} ({:.2}%)", title, value.0, value.1, percent));
        }

        let mut categories: Vec<_> = to_print.into_iter().collect();
        categories.sort();
        for (category, mut items) in categories {
            items.sort();
            writeln!(dest, "  {}", category)?;
            for item in items {
                writeln!(dest, "    {}", item)?;
            }
        }
        Ok(())
    }
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        StatsAccumulator::new()
    }
}

#[inline]
pub fn get_category_and_title(s: &str) -> (&str, &str) {
    let mut split = s.splitn(2, '/');
    match (split.next(), split.next()) {
        (Some(category), Some(title)) => (category, title),
        (Some(title), None) => ("", title),
        _ => ("", ""),
    }
}
