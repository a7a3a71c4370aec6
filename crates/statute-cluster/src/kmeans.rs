//! Lloyd's k-means with deterministic farthest-point seeding.

use ndarray::{Array2, ArrayView1, ArrayView2};
use statute_core::{Error, Result};

/// Iteration cap for Lloyd's algorithm.
pub const MAX_ITER: usize = 100;

/// Result of one k-means run.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
}

pub(crate) fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

pub(crate) fn check_features(data: ArrayView2<f64>, k: usize) -> Result<()> {
    let n = data.nrows();
    if n == 0 || data.ncols() == 0 {
        return Err(Error::Clustering(format!(
            "empty feature matrix ({}x{})",
            n,
            data.ncols()
        )));
    }
    if k == 0 || k > n {
        return Err(Error::Clustering(format!("cannot fit {k} clusters to {n} samples")));
    }
    if data.iter().any(|x| !x.is_finite()) {
        return Err(Error::Clustering("feature matrix contains non-finite values".into()));
    }
    Ok(())
}

/// First centroid is row 0; each next one is the row farthest from the
/// centroids chosen so far (lowest index on ties).
fn seed_centroids(data: ArrayView2<f64>, k: usize) -> Array2<f64> {
    let n = data.nrows();
    let mut chosen: Vec<usize> = vec![0];
    let mut nearest: Vec<f64> = (0..n)
        .map(|i| squared_distance(data.row(i), data.row(0)))
        .collect();

    while chosen.len() < k {
        let mut best = None;
        for i in 0..n {
            if chosen.contains(&i) {
                continue;
            }
            match best {
                Some(b) if nearest[b] >= nearest[i] => {}
                _ => best = Some(i),
            }
        }
        let Some(next) = best else { break };
        chosen.push(next);
        for i in 0..n {
            nearest[i] = nearest[i].min(squared_distance(data.row(i), data.row(next)));
        }
    }

    let mut centroids = Array2::zeros((k, data.ncols()));
    for (c, &row) in chosen.iter().enumerate() {
        centroids.row_mut(c).assign(&data.row(row));
    }
    centroids
}

fn nearest_centroid(point: ArrayView1<f64>, centroids: &Array2<f64>) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (c, centroid) in centroids.rows().into_iter().enumerate() {
        let d = squared_distance(point, centroid);
        if d < best.1 {
            best = (c, d);
        }
    }
    best
}

/// Fit `k` clusters to the rows of `data`.
pub fn fit_kmeans(data: ArrayView2<f64>, k: usize) -> Result<KMeansFit> {
    check_features(data, k)?;
    let n = data.nrows();
    let mut centroids = seed_centroids(data, k);
    let mut labels = vec![usize::MAX; n];

    for _ in 0..MAX_ITER {
        let mut changed = false;
        for i in 0..n {
            let (c, _) = nearest_centroid(data.row(i), &centroids);
            if labels[i] != c {
                labels[i] = c;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = Array2::<f64>::zeros(centroids.raw_dim());
        let mut counts = vec![0usize; k];
        for (i, &c) in labels.iter().enumerate() {
            counts[c] += 1;
            let mut row = sums.row_mut(c);
            row += &data.row(i);
        }
        for c in 0..k {
            // An emptied cluster keeps its previous centroid.
            if counts[c] > 0 {
                let mean = &sums.row(c) / counts[c] as f64;
                centroids.row_mut(c).assign(&mean);
            }
        }
    }

    let inertia: f64 = (0..n)
        .map(|i| squared_distance(data.row(i), centroids.row(labels[i])))
        .sum();
    if !inertia.is_finite() {
        return Err(Error::Clustering("k-means inertia is not finite".into()));
    }

    Ok(KMeansFit {
        labels,
        centroids,
        inertia,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_blobs() -> Array2<f64> {
        array![
            [0.0, 0.0],
            [0.1, 0.0],
            [0.0, 0.1],
            [5.0, 5.0],
            [5.1, 5.0],
            [5.0, 5.1],
        ]
    }

    #[test]
    fn test_separates_blobs() {
        let data = two_blobs();
        let fit = fit_kmeans(data.view(), 2).unwrap();
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[0], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_ne!(fit.labels[0], fit.labels[3]);
        assert!(fit.inertia < 0.1);
    }

    #[test]
    fn test_inertia_decreases_with_k() {
        let data = two_blobs();
        let one = fit_kmeans(data.view(), 1).unwrap().inertia;
        let two = fit_kmeans(data.view(), 2).unwrap().inertia;
        let three = fit_kmeans(data.view(), 3).unwrap().inertia;
        assert!(one > two);
        assert!(two >= three);
    }

    #[test]
    fn test_identical_points() {
        let data = Array2::<f64>::ones((4, 3));
        let fit = fit_kmeans(data.view(), 2).unwrap();
        assert!(fit.labels.iter().all(|&l| l == 0));
        assert_eq!(fit.inertia, 0.0);
    }

    #[test]
    fn test_invalid_requests() {
        let data = two_blobs();
        assert!(fit_kmeans(data.view(), 0).is_err());
        assert!(fit_kmeans(data.view(), 7).is_err());
        assert!(fit_kmeans(Array2::<f64>::zeros((3, 0)).view(), 1).is_err());
        let mut bad = two_blobs();
        bad[[0, 0]] = f64::NAN;
        assert!(fit_kmeans(bad.view(), 2).is_err());
    }
}
