//! Trains all three models on generated data.
//!
//! ```text
//! RUST_LOG=debug cargo run -p linfit --example synthetic
//! ```

use env_logger::{Builder, Env};
use log::info;

use linfit::core::Matrix;
use linfit::linear::{LinearRegression, LogisticRegression, MultinomialLogisticRegression};
use linfit::optim::TrainingOptions;
use linfit::preprocessing::{one_hot_encode, train_test_split};

fn wobble(i: usize) -> f64 {
    ((i * 7919) % 13) as f64 / 13.0 - 0.5
}

fn regression() -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<Vec<f64>> = (0..200).map(|i| vec![i as f64 / 10.0, wobble(i) * 4.0]).collect();
    let labels: Vec<f64> = rows.iter().map(|r| 2.0 * r[0] + 3.0 - r[1]).collect();
    let x = Matrix::from_vec2d(&rows)?;
    let y = Matrix::column(&labels);
    let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, 0.25, Some(7))?;

    let mut model = LinearRegression::new(&x_train, &y_train, TrainingOptions::default())?;
    model.train()?;
    info!("linear regression: R² = {:.4}", model.test(&x_test, &y_test)?);
    info!("weights:\n{}", model.weights());
    info!("loss curve: {:?}", &model.history().chronological()[..5]);
    Ok(())
}

fn binary() -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<Vec<f64>> = (0..200)
        .map(|i| {
            let centre = if i % 2 == 0 { 0.0 } else { 4.0 };
            vec![centre + wobble(i), centre + wobble(i + 3)]
        })
        .collect();
    let labels: Vec<f64> = (0..200).map(|i| (i % 2) as f64).collect();
    let x = Matrix::from_vec2d(&rows)?;
    let y = Matrix::column(&labels);
    let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, 0.25, Some(7))?;

    let options = TrainingOptions::new().with_learning_rate(0.5);
    let mut model = LogisticRegression::new(&x_train, &y_train, options)?;
    model.train()?;
    info!("logistic regression: accuracy = {:.3}", model.test(&x_test, &y_test)?);
    info!(
        "final loss {:?}, learning rate {:.4}",
        model.history().latest(),
        model.learning_rate()
    );
    Ok(())
}

fn multiclass() -> Result<(), Box<dyn std::error::Error>> {
    let centres = [(0.0, 0.0), (5.0, 0.0), (0.0, 5.0)];
    let classes: Vec<usize> = (0..300).map(|i| i % 3).collect();
    let rows: Vec<Vec<f64>> = classes
        .iter()
        .enumerate()
        .map(|(i, &c)| vec![centres[c].0 + wobble(i), centres[c].1 + wobble(i + 5)])
        .collect();
    let x = Matrix::from_vec2d(&rows)?;
    let y: Matrix<f64> = one_hot_encode(&classes, 3)?;
    let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, 0.25, Some(7))?;

    let options = TrainingOptions::new().with_learning_rate(0.5).with_batch_size(25);
    let mut model = MultinomialLogisticRegression::new(&x_train, &y_train, options)?;
    model.train()?;
    info!("multinomial regression: accuracy = {:.3}", model.test(&x_test, &y_test)?);
    info!("probabilities for the first test rows:\n{}", model.predict_proba(&x_test.slice_rows(0, 3)?)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    regression()?;
    binary()?;
    multiclass()?;
    Ok(())
}
