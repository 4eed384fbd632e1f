//! Functionality for running the cold room simulation.
//!
//! A month is simulated as [`TICKS_PER_MONTH`] five-minute ticks. Tick 0 holds the initial
//! conditions and each subsequent tick samples the door, asks the thermostat whether to run the
//! compressor and then updates the room's temperature and costs.
use crate::model::{Model, RoomParameters};
use crate::output::{DataWriter, write_metadata};
use crate::price::PriceSeries;
use crate::thermostat::Thermostat;
use anyhow::{Context, Result};
use itertools::{Itertools, MinMaxResult};
use log::{debug, info};
use std::path::Path;

pub mod door;
pub use door::{DoorSampler, RandomDoor};
pub mod tick;
use tick::simulate_tick;

/// The number of ticks in a simulated month (30 days of five-minute ticks)
pub const TICKS_PER_MONTH: usize = 8640;

/// The temperature of the room at the start of every month
pub const INITIAL_TEMPERATURE: f64 = 5.0;

/// What a thermostat can see of the room when making a decision
#[derive(Debug, Clone)]
pub struct RoomState<'a> {
    /// The tick being simulated
    pub tick: usize,
    /// The temperature at the end of the previous tick
    pub temperature: f64,
    /// Electricity prices
    pub prices: &'a PriceSeries,
}

impl<'a> RoomState<'a> {
    /// The state at the start of a month, before the first tick is simulated
    pub fn new(prices: &'a PriceSeries, temperature: f64) -> Self {
        Self {
            tick: 1,
            temperature,
            prices,
        }
    }

    /// The price of power for the current tick
    pub fn current_price(&self) -> f64 {
        self.prices.price(self.tick)
    }
}

/// The total costs for a simulated month
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthResult {
    /// Cost of food lost to spoilage
    pub food_loss_cost: f64,
    /// Cost of power used by the compressor
    pub power_cost: f64,
}

impl MonthResult {
    /// The sum of food loss and power costs
    pub fn total_cost(&self) -> f64 {
        self.food_loss_cost + self.power_cost
    }
}

/// Tick-by-tick record of a simulated month.
///
/// All fields have one entry per tick. Entry 0 is the initial condition, where the door is shut,
/// the compressor is off and there are no costs.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthHistory {
    /// Whether the door was open
    pub door_open: Vec<bool>,
    /// Whether the compressor was running
    pub compressor_on: Vec<bool>,
    /// Temperature at the end of the tick
    pub temperature: Vec<f64>,
    /// Cost of food lost during the tick
    pub food_loss_cost: Vec<f64>,
    /// Cost of power used during the tick
    pub power_cost: Vec<f64>,
}

impl MonthHistory {
    /// Create a history for a month starting at `initial_temperature`
    pub fn new(initial_temperature: f64) -> Self {
        let mut temperature = vec![0.0; TICKS_PER_MONTH];
        temperature[0] = initial_temperature;

        Self {
            door_open: vec![false; TICKS_PER_MONTH],
            compressor_on: vec![false; TICKS_PER_MONTH],
            temperature,
            food_loss_cost: vec![0.0; TICKS_PER_MONTH],
            power_cost: vec![0.0; TICKS_PER_MONTH],
        }
    }

    /// Sum the costs over the month
    pub fn totals(&self) -> MonthResult {
        MonthResult {
            food_loss_cost: self.food_loss_cost.iter().sum(),
            power_cost: self.power_cost.iter().sum(),
        }
    }
}

/// A cold room controlled by a particular thermostat
pub struct Cooler<'a, D: DoorSampler> {
    thermostat: &'a dyn Thermostat,
    prices: &'a PriceSeries,
    room: &'a RoomParameters,
    door: D,
}

impl<'a, D: DoorSampler> Cooler<'a, D> {
    /// Create a new [`Cooler`]
    ///
    /// # Arguments
    ///
    /// * `thermostat` - Decides when the compressor runs
    /// * `prices` - Electricity prices
    /// * `room` - Physical properties of the room
    /// * `door` - Decides when the door is open
    pub fn new(
        thermostat: &'a dyn Thermostat,
        prices: &'a PriceSeries,
        room: &'a RoomParameters,
        door: D,
    ) -> Self {
        Self {
            thermostat,
            prices,
            room,
            door,
        }
    }

    /// Simulate a month, returning the full tick-by-tick history.
    ///
    /// Every month starts from [`INITIAL_TEMPERATURE`], regardless of how previous months ended.
    pub fn simulate_month_detailed(&mut self) -> MonthHistory {
        let mut history = MonthHistory::new(INITIAL_TEMPERATURE);
        let mut state = RoomState::new(self.prices, INITIAL_TEMPERATURE);
        while state.tick < TICKS_PER_MONTH {
            // NB: The door must be sampled before the thermostat is consulted
            let door_open = self.door.is_door_open();
            let compressor_on = self.thermostat.evaluate_cooler_state(&state);
            simulate_tick(self.room, &mut state, door_open, compressor_on, &mut history);
        }

        history
    }

    /// Simulate a month, returning the total costs
    pub fn simulate_month(&mut self) -> MonthResult {
        self.simulate_month_detailed().totals()
    }

    /// Simulate `months` independent months
    pub fn simulate_n_months(&mut self, months: u32) -> MonthlyResults {
        (1..=months)
            .map(|month| {
                let result = self.simulate_month();
                debug!(
                    "Month {month}: food loss cost {:.2}, power cost {:.2}",
                    result.food_loss_cost, result.power_cost
                );
                result
            })
            .collect()
    }
}

/// Costs for a sequence of simulated months
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlyResults(Vec<MonthResult>);

impl FromIterator<MonthResult> for MonthlyResults {
    fn from_iter<I: IntoIterator<Item = MonthResult>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl MonthlyResults {
    /// Iterate over the results for each month
    pub fn iter(&self) -> std::slice::Iter<'_, MonthResult> {
        self.0.iter()
    }

    /// The number of months
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no months
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn mean<F>(&self, f: F) -> Option<f64>
    where
        F: Fn(&MonthResult) -> f64,
    {
        (!self.is_empty()).then(|| self.iter().map(f).sum::<f64>() / self.len() as f64)
    }

    /// Mean food loss cost per month
    pub fn mean_food_loss_cost(&self) -> Option<f64> {
        self.mean(|result| result.food_loss_cost)
    }

    /// Mean power cost per month
    pub fn mean_power_cost(&self) -> Option<f64> {
        self.mean(|result| result.power_cost)
    }

    /// Mean total cost per month
    pub fn mean_total_cost(&self) -> Option<f64> {
        self.mean(MonthResult::total_cost)
    }

    /// The cheapest and most expensive monthly total costs
    pub fn total_cost_range(&self) -> Option<(f64, f64)> {
        match self
            .iter()
            .map(MonthResult::total_cost)
            .minmax_by(f64::total_cmp)
        {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(cost) => Some((cost, cost)),
            MinMaxResult::MinMax(min, max) => Some((min, max)),
        }
    }
}

/// Run the simulation.
///
/// Each thermostat in the model is simulated with a door sampler seeded identically, so that
/// compared thermostats see the same door openings.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
pub fn run(model: &Model, output_path: &Path) -> Result<()> {
    let params = &model.parameters;
    let seed = params.seed.unwrap_or_else(rand::random);
    info!("Random seed: {seed}");

    write_metadata(output_path, model, seed).context("Failed to save metadata")?;
    let mut writer = DataWriter::create(output_path)?;
    for thermostat in model.iter_thermostats() {
        let door = RandomDoor::from_seed(seed);
        let mut cooler = Cooler::new(thermostat, &model.prices, &params.room, door);

        if params.simulate_multiple_months {
            info!(
                "Simulating {} months with {} thermostat",
                params.simulation_steps,
                thermostat.name()
            );
            let results = cooler.simulate_n_months(params.simulation_steps);
            log_summary(thermostat.name(), &results);
            writer.write_monthly_costs(thermostat.name(), &results)?;
        } else {
            info!("Simulating one month with {} thermostat", thermostat.name());
            let history = cooler.simulate_month_detailed();
            let totals = history.totals();
            info!(
                "{}: food loss cost {:.2}, power cost {:.2}, total {:.2}",
                thermostat.name(),
                totals.food_loss_cost,
                totals.power_cost,
                totals.total_cost()
            );
            writer.write_tick_history(thermostat.name(), &history)?;
        }
    }

    writer.flush()
}

/// Log the average costs over many months
fn log_summary(name: &str, results: &MonthlyResults) {
    let (Some(food), Some(power), Some((min, max))) = (
        results.mean_food_loss_cost(),
        results.mean_power_cost(),
        results.total_cost_range(),
    ) else {
        return;
    };

    info!(
        "{name}: average food loss cost {food:.2}, average power cost {power:.2} over {} months \
        (monthly total between {min:.2} and {max:.2})",
        results.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{ClosedDoor, constant_prices, prices_with, room_parameters};
    use crate::thermostat::{BargainThermostat, SimpleThermostat};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use std::cell::RefCell;

    /// Records what it was shown and always runs the compressor
    #[derive(Default)]
    struct RecordingThermostat {
        seen: RefCell<Vec<(usize, f64)>>,
    }

    impl Thermostat for RecordingThermostat {
        fn evaluate_cooler_state(&self, room: &RoomState) -> bool {
            self.seen.borrow_mut().push((room.tick, room.temperature));
            true
        }
    }

    /// A door and a thermostat which note down each time they are asked for a decision
    struct CallLog<'a>(&'a RefCell<Vec<&'static str>>);

    impl DoorSampler for CallLog<'_> {
        fn is_door_open(&mut self) -> bool {
            self.0.borrow_mut().push("door");
            false
        }
    }

    impl Thermostat for CallLog<'_> {
        fn evaluate_cooler_state(&self, _room: &RoomState) -> bool {
            self.0.borrow_mut().push("thermostat");
            false
        }
    }

    fn bargain(price_threshold: f64) -> BargainThermostat {
        BargainThermostat { price_threshold }
    }

    #[rstest]
    fn test_month_initial_conditions(room_parameters: RoomParameters) {
        let prices = constant_prices(0.2);
        let thermostat = bargain(0.3);
        let mut cooler = Cooler::new(
            &thermostat,
            &prices,
            &room_parameters,
            RandomDoor::from_seed(1),
        );

        for _ in 0..3 {
            let history = cooler.simulate_month_detailed();
            for values in [
                &history.temperature,
                &history.food_loss_cost,
                &history.power_cost,
            ] {
                assert_eq!(values.len(), TICKS_PER_MONTH);
            }
            assert_eq!(history.door_open.len(), TICKS_PER_MONTH);
            assert_eq!(history.compressor_on.len(), TICKS_PER_MONTH);

            // No carry-over from the previous month
            assert_eq!(history.temperature[0], 5.0);
            assert_eq!(history.food_loss_cost[0], 0.0);
            assert_eq!(history.power_cost[0], 0.0);
            assert!(history.temperature[TICKS_PER_MONTH - 1] < 5.0);
        }
    }

    #[test]
    fn test_month_start_not_configurable() {
        // The starting temperature is fixed, whatever the room table says
        let room: RoomParameters = toml::from_str("initial_temperature = 12.0").unwrap();
        assert_eq!(room, RoomParameters::default());

        let prices = constant_prices(0.5);
        let thermostat = SimpleThermostat { temperature: 5.0 };
        let mut cooler = Cooler::new(&thermostat, &prices, &room, ClosedDoor);
        assert_eq!(cooler.simulate_month_detailed().temperature[0], 5.0);
    }

    #[rstest]
    fn test_thermostat_sees_each_tick_in_order(room_parameters: RoomParameters) {
        let prices = constant_prices(0.2);
        let thermostat = RecordingThermostat::default();
        let mut cooler = Cooler::new(&thermostat, &prices, &room_parameters, ClosedDoor);
        let history = cooler.simulate_month_detailed();

        let seen = thermostat.seen.into_inner();
        assert_eq!(seen.len(), TICKS_PER_MONTH - 1);
        for (i, (tick, temperature)) in seen.into_iter().enumerate() {
            assert_eq!(tick, i + 1);
            assert_eq!(temperature, history.temperature[i]);
        }
    }

    #[rstest]
    fn test_door_sampled_before_thermostat(room_parameters: RoomParameters) {
        let prices = constant_prices(0.2);
        let calls = RefCell::new(Vec::new());
        let thermostat = CallLog(&calls);
        let mut cooler = Cooler::new(&thermostat, &prices, &room_parameters, CallLog(&calls));
        cooler.simulate_month();

        let calls = calls.into_inner();
        assert_eq!(calls.len(), 2 * (TICKS_PER_MONTH - 1));
        for pair in calls.chunks(2) {
            assert_eq!(pair, ["door", "thermostat"]);
        }
    }

    #[rstest]
    fn test_simulate_month_reproducible(room_parameters: RoomParameters) {
        let prices = prices_with(1.0, &[(10, 0.1), (500, 0.2), (4000, 0.05)]);
        let thermostat = SimpleThermostat { temperature: 4.0 };
        let simulate = || {
            let mut cooler = Cooler::new(
                &thermostat,
                &prices,
                &room_parameters,
                RandomDoor::from_seed(99),
            );
            (cooler.simulate_month(), cooler.simulate_month())
        };

        let (first1, second1) = simulate();
        let (first2, second2) = simulate();
        assert_eq!(first1, first2);
        assert_eq!(second1, second2);

        // Later months draw different door openings
        assert_ne!(first1, second1);
    }

    #[rstest]
    fn test_bargain_cheap_power(room_parameters: RoomParameters) {
        let prices = constant_prices(0.2);
        let thermostat = bargain(0.3);
        let mut cooler = Cooler::new(
            &thermostat,
            &prices,
            &room_parameters,
            RandomDoor::from_seed(5),
        );
        let history = cooler.simulate_month_detailed();

        assert!(history.compressor_on[1..].iter().all(|&on| on));
        assert_approx_eq!(
            f64,
            history.totals().power_cost,
            0.2 * (TICKS_PER_MONTH - 1) as f64,
            epsilon = 1e-6
        );
    }

    #[rstest]
    fn test_bargain_expensive_power(room_parameters: RoomParameters) {
        let prices = constant_prices(1.0);
        let thermostat = bargain(0.3);
        let mut cooler = Cooler::new(
            &thermostat,
            &prices,
            &room_parameters,
            RandomDoor::from_seed(5),
        );
        let history = cooler.simulate_month_detailed();

        assert!(history.compressor_on.iter().all(|&on| !on));
        assert_eq!(history.totals().power_cost, 0.0);

        // With no cooling, the room warms towards the ambient temperature
        assert!(
            history
                .temperature
                .iter()
                .tuple_windows()
                .all(|(t1, t2)| t2 > t1)
        );
        let last = history.temperature[TICKS_PER_MONTH - 1];
        assert!(last > 6.5 && last < 20.0);
        assert!(history.totals().food_loss_cost > 0.0);
    }

    #[rstest]
    fn test_simple_thermostat_boundary(room_parameters: RoomParameters) {
        let prices = constant_prices(0.5);
        let thermostat = SimpleThermostat { temperature: 5.0 };
        let mut cooler = Cooler::new(&thermostat, &prices, &room_parameters, ClosedDoor);
        let history = cooler.simulate_month_detailed();

        // 5.0 is not above 5.0, so the compressor starts off. The room then warms slightly.
        assert!(!history.compressor_on[1]);
        assert!(history.temperature[1] > 5.0);
        assert!(history.compressor_on[2]);
        assert!(history.door_open.iter().all(|&open| !open));
    }

    #[rstest]
    fn test_simulate_n_months(room_parameters: RoomParameters) {
        let prices = constant_prices(0.5);
        let thermostat = SimpleThermostat { temperature: 5.0 };
        let mut cooler = Cooler::new(
            &thermostat,
            &prices,
            &room_parameters,
            RandomDoor::from_seed(3),
        );
        let results = cooler.simulate_n_months(4);
        assert_eq!(results.len(), 4);

        let (min, max) = results.total_cost_range().unwrap();
        let mean = results.mean_total_cost().unwrap();
        assert!(min <= mean && mean <= max);
        assert_approx_eq!(
            f64,
            mean,
            results.mean_food_loss_cost().unwrap() + results.mean_power_cost().unwrap(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_monthly_results_summary() {
        let results: MonthlyResults = [
            MonthResult {
                food_loss_cost: 1.0,
                power_cost: 10.0,
            },
            MonthResult {
                food_loss_cost: 3.0,
                power_cost: 20.0,
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(results.mean_food_loss_cost(), Some(2.0));
        assert_eq!(results.mean_power_cost(), Some(15.0));
        assert_eq!(results.mean_total_cost(), Some(17.0));
        assert_eq!(results.total_cost_range(), Some((11.0, 23.0)));

        let empty = MonthlyResults::default();
        assert_eq!(empty.mean_total_cost(), None);
        assert_eq!(empty.total_cost_range(), None);
    }
}
