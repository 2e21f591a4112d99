//! Random-number capabilities shared by the sampler and by user models.

use rand::Rng;
use rand_distr::StandardNormal;

/// The draws the sampler and its models need, provided on top of any
/// [`rand::Rng`].
///
/// The methods are deliberately small wrappers: every generator that `rand`
/// knows about (and that can be serialized for checkpointing, such as
/// [`rand_pcg::Pcg64`]) gets them for free through the blanket
/// implementation.
pub trait RandomKit: Rng {
    /// A uniform draw from $[0, 1)$.
    fn rand(&mut self) -> f64 {
        self.gen::<f64>()
    }

    /// A standard normal draw.
    fn randn(&mut self) -> f64 {
        self.sample(StandardNormal)
    }

    /// A heavy-tailed draw used for proposal step sizes,
    ///
    /// $$ 10^{1.5 - 3 |n_1|} \cdot n_2, \qquad n_1, n_2 \sim N(0, 1). $$
    ///
    /// The distribution is symmetric about zero and mixes step sizes over
    /// several orders of magnitude, so proposals occasionally make large
    /// jumps. The form is held fixed for the lifetime of a run; changing it
    /// between a checkpoint and a resume would silently change the kernel.
    fn randh(&mut self) -> f64 {
        let scale = 10.0_f64.powf(1.5 - 3.0 * self.randn().abs());
        scale * self.randn()
    }

    /// A uniform integer draw from $[0, n)$.
    fn rand_int(&mut self, n: usize) -> usize {
        self.gen_range(0..n)
    }
}

impl<R: Rng + ?Sized> RandomKit for R {}

/// Wraps `x` periodically into $[\text{min}, \text{max})$.
///
/// The wrap is a translation, so a perturbation `x + step` followed by
/// `wrap` is a symmetric proposal and carries no Hastings correction.
pub fn wrap(x: f64, min: f64, max: f64) -> f64 {
    min + (x - min).rem_euclid(max - min)
}
