use discrim::metrics::{accuracy_score, confusion_matrix};
use discrim::{Dataset, DiscriminantAnalysis, Matrix, Strategy};
use ndarray::{concatenate, Array2, Axis};
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;

const SPECIES: [&str; 3] = ["setosa", "versicolor", "virginica"];

// Per-species feature means and standard deviations of Fisher's measurements.
const MEANS: [[f64; 4]; 3] = [
    [5.006, 3.428, 1.462, 0.246],
    [5.936, 2.770, 4.260, 1.326],
    [6.588, 2.974, 5.552, 2.026],
];
const SDS: [[f64; 4]; 3] = [
    [0.352, 0.379, 0.174, 0.105],
    [0.516, 0.314, 0.470, 0.198],
    [0.636, 0.322, 0.552, 0.275],
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut rng = StdRng::seed_from_u64(42);

    // Step 1: Sample 50 flowers per species
    let data = sample_species(&mut rng, 50, 0)?;
    println!("Dataset: {} samples, {} features", data.n_samples(), data.n_features());

    // Step 2: Split into train/test
    let (train, test) = data.train_test_split(0.5, Some(7))?;
    let classes: Vec<String> = SPECIES.iter().map(|s| s.to_string()).collect();

    // Step 3: Fit and evaluate every strategy
    println!("\n{:<12} {:>8}", "strategy", "accuracy");
    for strategy in Strategy::ALL {
        let model = DiscriminantAnalysis::new(strategy).fit(&train)?;
        let predicted = model.predict_classes(test.features())?;
        let accuracy = accuracy_score(test.labels(), &predicted)?;
        println!("{:<12} {:>8.4}", strategy, accuracy);
    }

    let model = DiscriminantAnalysis::new(Strategy::Lda).fit(&train)?;
    let predicted = model.predict_classes(test.features())?;
    println!("\nLDA confusion matrix (rows = true, columns = predicted):");
    println!("{}", confusion_matrix(&classes, test.labels(), &predicted)?);

    // Step 4: More features than observations
    let wide = sample_species(&mut rng, 4, 20)?;
    println!("\nWide dataset: {} samples, {} features", wide.n_samples(), wide.n_features());
    for strategy in [Strategy::Lda, Strategy::LdaPseudo, Strategy::LdaSchafer, Strategy::Mdeb] {
        match DiscriminantAnalysis::new(strategy).fit(&wide) {
            Ok(model) => {
                let predicted = model.predict_classes(wide.features())?;
                let accuracy = accuracy_score(wide.labels(), &predicted)?;
                println!("  {:<12} training accuracy {:.4}", strategy, accuracy);
            }
            Err(err) => println!("  {:<12} failed: {}", strategy, err),
        }
    }

    Ok(())
}

/// `per_class` rows per species, followed by `noise` standard normal columns.
fn sample_species(
    rng: &mut StdRng,
    per_class: usize,
    noise: usize,
) -> Result<Dataset<String>, Box<dyn std::error::Error>> {
    let mut blocks: Vec<Matrix> = Vec::new();
    let mut labels = Vec::new();

    for (k, species) in SPECIES.iter().enumerate() {
        let mut block = Array2::zeros((per_class, 4 + noise));
        for j in 0..4 {
            let column = Array2::random_using((per_class, 1), Normal::new(MEANS[k][j], SDS[k][j])?, rng);
            block.column_mut(j).assign(&column.column(0));
        }
        if noise > 0 {
            let extra = Array2::random_using((per_class, noise), Normal::new(0.0, 1.0)?, rng);
            block.slice_mut(ndarray::s![.., 4..]).assign(&extra);
        }
        blocks.push(block);
        labels.extend(std::iter::repeat(species.to_string()).take(per_class));
    }

    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    let features = concatenate(Axis(0), &views)?;
    Ok(Dataset::new(features, labels)?)
}
