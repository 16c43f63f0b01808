use ndarray::Array2;

use super::blur::box_filter;

/// Edge-preserving guided filter (He, Sun, Tang).
///
/// Smooths `input` while following edges of the `guide` plane. Used to
/// refine the coarse transmission map without introducing halos.
///
/// `radius` is the box window radius; `eps` regularizes the per-window
/// linear model (larger eps = smoother output).
pub fn guided_filter(guide: &Array2<f32>, input: &Array2<f32>, radius: usize, eps: f32) -> Array2<f32> {
    assert_eq!(guide.dim(), input.dim());

    let mean_i = box_filter(guide, radius);
    let mean_p = box_filter(input, radius);

    let ip = guide * input;
    let ii = guide * guide;
    let mean_ip = box_filter(&ip, radius);
    let mean_ii = box_filter(&ii, radius);

    // cov(I, p) and var(I) per window.
    let cov_ip = &mean_ip - &(&mean_i * &mean_p);
    let var_i = &mean_ii - &(&mean_i * &mean_i);

    let a = ndarray::Zip::from(&cov_ip)
        .and(&var_i)
        .map_collect(|&c, &v| c / (v + eps));
    let b = ndarray::Zip::from(&mean_p)
        .and(&a)
        .and(&mean_i)
        .map_collect(|&mp, &av, &mi| mp - av * mi);

    let mean_a = box_filter(&a, radius);
    let mean_b = box_filter(&b, radius);

    ndarray::Zip::from(&mean_a)
        .and(guide)
        .and(&mean_b)
        .map_collect(|&ma, &g, &mb| ma * g + mb)
}
