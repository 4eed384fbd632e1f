//! The electricity price series which drives the cost of running the compressor.
use crate::input::{input_err_msg, read_vec_from_csv};
use crate::simulation::TICKS_PER_MONTH;
use anyhow::{Context, Result, bail, ensure};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

/// Which ticks of the month are chosen, for a given partition size and number of purchases
type CheapestTicksMap = HashMap<(usize, usize), Vec<bool>>;

/// Electricity prices, one per simulation tick.
///
/// Prices are looked up by tick index, so the same entries are reused for every simulated month.
/// Any reads of a range of prices are clamped to the length of the series.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    prices: Vec<f64>,
    /// Lazily computed results of [`PriceSeries::is_among_cheapest`]
    cheapest_ticks: RefCell<CheapestTicksMap>,
}

impl PartialEq for PriceSeries {
    fn eq(&self, other: &Self) -> bool {
        self.prices == other.prices
    }
}

impl PriceSeries {
    /// Create a new [`PriceSeries`], checking that there is a finite price for every tick.
    pub fn new(prices: Vec<f64>) -> Result<Self> {
        ensure!(
            prices.len() >= TICKS_PER_MONTH,
            "Price series must contain at least {TICKS_PER_MONTH} entries (found {})",
            prices.len()
        );

        if let Some((tick, price)) = prices.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            bail!("Price for tick {tick} is not a finite number: {price}");
        }

        Ok(Self {
            prices,
            cheapest_ticks: RefCell::default(),
        })
    }

    /// Read prices from a CSV file.
    ///
    /// The file must have a header row. The first column (a timestamp) is ignored and the second
    /// column holds the price.
    pub fn from_csv(file_path: &Path) -> Result<Self> {
        let rows: Vec<(String, f64)> = read_vec_from_csv(file_path)?;
        let prices = rows.into_iter().map(|(_, price)| price).collect();
        Self::new(prices).with_context(|| input_err_msg(file_path))
    }

    /// The number of prices in the series
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether the series is empty (never true for a validated series)
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// The price at the given tick.
    ///
    /// # Panics
    ///
    /// If `tick` is past the end of the series.
    pub fn price(&self, tick: usize) -> f64 {
        self.prices[tick]
    }

    /// Clamp a range of ticks so that it lies within the series
    fn clamp(&self, start: usize, end: usize) -> Range<usize> {
        let end = end.min(self.len());
        start.min(end)..end
    }

    /// The (up to) `count` prices immediately before `tick`
    pub fn trailing(&self, tick: usize, count: usize) -> &[f64] {
        &self.prices[self.clamp(tick.saturating_sub(count), tick)]
    }

    /// The (up to) `count` prices immediately after `tick`
    pub fn leading(&self, tick: usize, count: usize) -> &[f64] {
        &self.prices[self.clamp(tick.saturating_add(1), tick.saturating_add(count).saturating_add(1))]
    }

    /// The prices within `radius` ticks of `tick`, including the price at `tick` itself
    pub fn surrounding(&self, tick: usize, radius: usize) -> &[f64] {
        &self.prices[self.clamp(tick.saturating_sub(radius), tick.saturating_add(radius).saturating_add(1))]
    }

    /// Whether `tick` is one of the `count` cheapest ticks in its partition of the month.
    ///
    /// The month is divided into contiguous partitions of `size` ticks, the last of which is
    /// truncated at the end of the month. Ties between equal prices go to the earlier tick. The
    /// choices for each `(size, count)` are computed once and then reused.
    ///
    /// # Panics
    ///
    /// If `size` is zero.
    pub fn is_among_cheapest(&self, tick: usize, size: usize, count: usize) -> bool {
        let mut cache = self.cheapest_ticks.borrow_mut();
        let chosen = cache
            .entry((size, count))
            .or_insert_with(|| self.choose_cheapest(size, count));

        chosen.get(tick).copied().unwrap_or(false)
    }

    /// Mark the `count` cheapest ticks of each partition of the month
    fn choose_cheapest(&self, size: usize, count: usize) -> Vec<bool> {
        let mut chosen = vec![false; TICKS_PER_MONTH];
        for (i, partition) in self.prices[..TICKS_PER_MONTH].chunks(size).enumerate() {
            let start = i * size;
            let mut offsets: Vec<usize> = (0..partition.len()).collect();

            // Stable sort, so equal prices stay in tick order
            offsets.sort_by(|&a, &b| partition[a].total_cmp(&partition[b]));
            for offset in offsets.into_iter().take(count) {
                chosen[start + offset] = true;
            }
        }

        chosen
    }
}

/// The arithmetic mean of some prices, or `None` if there are none
pub fn mean_price(prices: &[f64]) -> Option<f64> {
    (!prices.is_empty()).then(|| prices.iter().sum::<f64>() / prices.len() as f64)
}
