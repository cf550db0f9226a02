use rand::Rng;

use crate::scoring::{Domains, FieldDomain};
use crate::supplier::SupplierRecord;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn within(value: f64, domain: FieldDomain) -> f64 {
    value.min(domain.max).max(domain.min)
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, domain: FieldDomain) -> f64 {
    if domain.min >= domain.max {
        return domain.min;
    }
    rng.gen_range(domain.min..=domain.max)
}

/// Whole days inside the domain. Config validation guarantees at least one.
fn whole_days<R: Rng + ?Sized>(rng: &mut R, domain: FieldDomain) -> u32 {
    let lo = domain.min.max(0.0).ceil() as u32;
    let hi = domain.max.max(0.0).floor() as u32;
    if lo >= hi {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

/// Generate `count` random suppliers named `Supplier_0001`, `Supplier_0002`, ...
///
/// Every metric is drawn uniformly from its domain, so for any domains that
/// pass `validate_config` the output passes record validation. Cost and CO2
/// are rounded to 2 decimals; rounding is clamped back into the domain.
pub fn generate_suppliers<R: Rng + ?Sized>(
    count: usize,
    domains: &Domains,
    rng: &mut R,
) -> Vec<SupplierRecord> {
    (1..=count)
        .map(|n| {
            let cost = within(round2(uniform(rng, domains.cost)), domains.cost);
            let co2 = within(round2(uniform(rng, domains.co2)), domains.co2);
            let delivery_time = whole_days(rng, domains.delivery_time);
            let ethical_score = uniform(rng, domains.ethical_score);
            SupplierRecord::new(
                format!("Supplier_{:04}", n),
                cost,
                co2,
                delivery_time,
                ethical_score,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::validate_batch;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generates_requested_count_with_names() {
        let mut rng = StdRng::seed_from_u64(7);
        let suppliers = generate_suppliers(12, &Domains::default(), &mut rng);
        assert_eq!(suppliers.len(), 12);
        assert_eq!(suppliers[0].name, "Supplier_0001");
        assert_eq!(suppliers[11].name, "Supplier_0012");
        assert!(suppliers.iter().all(|s| s.id.is_none()));
    }

    #[test]
    fn test_values_within_domains() {
        let domains = Domains::default();
        let mut rng = StdRng::seed_from_u64(42);
        let suppliers = generate_suppliers(200, &domains, &mut rng);

        assert!(validate_batch(&suppliers, &domains).is_ok());
        for s in &suppliers {
            assert!((1..=60).contains(&s.delivery_time));
            assert_eq!(round2(s.cost), s.cost);
            assert_eq!(round2(s.co2), s.co2);
        }
    }

    #[test]
    fn test_same_seed_reproducible() {
        let domains = Domains::default();
        let a = generate_suppliers(10, &domains, &mut StdRng::seed_from_u64(99));
        let b = generate_suppliers(10, &domains, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);

        let c = generate_suppliers(10, &domains, &mut StdRng::seed_from_u64(100));
        assert_ne!(a, c);
    }

    #[test]
    fn test_degenerate_domain_yields_constant() {
        let domains = Domains {
            cost: FieldDomain::new(250.0, 250.0),
            delivery_time: FieldDomain::new(5.0, 5.0),
            ..Domains::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let suppliers = generate_suppliers(5, &domains, &mut rng);
        assert!(suppliers.iter().all(|s| s.cost == 250.0));
        assert!(suppliers.iter().all(|s| s.delivery_time == 5));
    }

    #[test]
    fn test_fractional_delivery_domain_stays_inside() {
        let domains = Domains {
            delivery_time: FieldDomain::new(1.5, 2.7),
            ..Domains::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let suppliers = generate_suppliers(50, &domains, &mut rng);
        assert!(suppliers.iter().all(|s| s.delivery_time == 2));
        assert!(validate_batch(&suppliers, &domains).is_ok());
    }

    #[test]
    fn test_zero_count() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(generate_suppliers(0, &Domains::default(), &mut rng).is_empty());
    }
}
