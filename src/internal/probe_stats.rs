#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::pedantic)]

//! Measures probe lengths of the open addressing strategies at increasing
//! load factors and plots the averages and worst cases.

use hashtable_engine::{
    DoubleHashing, LinearProbing, OpenAddressingTable, ProbingStrategy, QuadraticProbing,
    TableConfig, TableError,
};
use plotters::prelude::*;
use rand::Rng;

// Requested slot count; linear and double hashing round it up to 2^16 + 1
const CAPACITY: usize = 1 << 16;
// Load factors from 0.1 to 0.9
const LOAD_FACTORS: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
const STRATEGIES: [&str; 3] = ["Linear Probing", "Quadratic Probing", "Double Hashing"];

#[derive(Debug, Default, Clone, Copy)]
struct ProbeStats {
    average: f64,
    worst: usize,
}

// Fills a fresh table up to `load` and measures the probe length of every key
fn measure<S>(keys: &[u64], load: f64) -> Result<ProbeStats, TableError>
where
    S: ProbingStrategy + Default + Clone,
{
    // The configured load factor sits above every target so the table never grows.
    let config = TableConfig::new(CAPACITY, 0.95);
    let mut table = OpenAddressingTable::<u64, u64, S>::with_config(config)?;
    let target = (table.capacity() as f64 * load) as usize;

    let inserted = &keys[..target.min(keys.len())];
    for &key in inserted {
        table.insert(key, key)?;
    }

    let lengths: Vec<usize> = inserted.iter().map(|key| table.probe_length(key)).collect();
    let average = lengths.iter().sum::<usize>() as f64 / lengths.len().max(1) as f64;
    let worst = lengths.iter().copied().max().unwrap_or(0);
    Ok(ProbeStats { average, worst })
}

fn draw_chart(
    path: &str,
    title: &str,
    y_desc: &str,
    series: &[Vec<f64>],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = series.iter().flatten().fold(0.0_f64, |max, &y| max.max(y)) * 1.1;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, 0.0..max_y.max(1.0))?;

    chart
        .configure_mesh()
        .x_desc("Load Factor")
        .y_desc(y_desc)
        .axis_desc_style(("sans-serif", 16))
        .draw()?;

    let colors = [RGBColor(220, 50, 50), RGBColor(50, 90, 220), RGBColor(50, 180, 50)];
    for (strategy_idx, &strategy) in STRATEGIES.iter().enumerate() {
        let color = colors[strategy_idx % colors.len()];
        let style = ShapeStyle::from(&color).stroke_width(2);
        let points: Vec<(f64, f64)> =
            LOAD_FACTORS.iter().copied().zip(series[strategy_idx].iter().copied()).collect();

        chart
            .draw_series(LineSeries::new(points.clone(), style))?
            .label(strategy)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        chart.draw_series(points.into_iter().map(|point| Circle::new(point, 4, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;
    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate random keys once so every strategy sees the same input
    let mut rng = rand::rng();
    let keys: Vec<u64> = (0..CAPACITY).map(|_| rng.random()).collect();

    let mut averages: Vec<Vec<f64>> = vec![Vec::new(); STRATEGIES.len()];
    let mut worst_cases: Vec<Vec<f64>> = vec![Vec::new(); STRATEGIES.len()];

    for &load in &LOAD_FACTORS {
        println!("Load factor {load:.1}");
        let results = [
            measure::<LinearProbing>(&keys, load)?,
            measure::<QuadraticProbing>(&keys, load)?,
            measure::<DoubleHashing>(&keys, load)?,
        ];
        for (strategy_idx, stats) in results.iter().enumerate() {
            println!(
                "  {}: Avg probes = {:.2}, Worst = {}",
                STRATEGIES[strategy_idx], stats.average, stats.worst
            );
            averages[strategy_idx].push(stats.average);
            worst_cases[strategy_idx].push(stats.worst as f64);
        }
    }

    draw_chart(
        "average_probe_length.png",
        "Average Probe Length by Strategy",
        "Slots visited (average)",
        &averages,
    )?;
    draw_chart(
        "worst_probe_length.png",
        "Worst-Case Probe Length by Strategy",
        "Slots visited (worst)",
        &worst_cases,
    )?;

    println!("Generated plot images: average_probe_length.png, worst_probe_length.png");
    Ok(())
}
