use bakery_domain::{finite_or_zero, HealthGrade, HealthInputs, HealthReport};

pub struct HealthService;

impl HealthService {
    /// Averages the margin, growth and budget component scores into `0..=100`.
    pub fn score(inputs: HealthInputs) -> HealthReport {
        let margin = finite_or_zero(inputs.profit_margin);
        let growth = finite_or_zero(inputs.revenue_growth);
        let adherence = finite_or_zero(inputs.budget_adherence);

        let profit_score = margin.min(50.0) * 2.0;
        let growth_score = (growth + 50.0).clamp(0.0, 100.0);
        let budget_score = adherence.min(100.0);
        let raw = ((profit_score + growth_score + budget_score) / 3.0).round();
        let score = raw.clamp(0.0, 100.0) as u8;

        HealthReport {
            score,
            grade: HealthGrade::from_score(score),
            profit_score,
            growth_score,
            budget_score,
            inputs,
        }
    }
}
