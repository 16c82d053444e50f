use crate::error::AppError;
use crate::geo::haversine_km;
use crate::models::partner::{DeliveryPartner, GeoPoint};

#[derive(Debug, Clone)]
pub struct Selection {
    pub partner: DeliveryPartner,
    pub distance_km: f64,
}

/// Picks the partner closest to `source` by great-circle distance.
/// Ties go to the first partner encountered in input order; the scan
/// uses strict `<`, so a NaN distance can never win a comparison.
pub fn nearest_partner(
    partners: &[DeliveryPartner],
    source: &GeoPoint,
) -> Result<Selection, AppError> {
    let mut best: Option<Selection> = None;

    for partner in partners {
        let distance_km = haversine_km(source, &partner.location);

        let closer = match &best {
            Some(current) => distance_km < current.distance_km,
            None => !distance_km.is_nan(),
        };

        if closer {
            best = Some(Selection {
                partner: partner.clone(),
                distance_km,
            });
        }
    }

    best.ok_or(AppError::NoPartnersAvailable)
}

/// Fixed-speed ETA heuristic: `minutes_per_km` minutes per kilometer of
/// haversine distance, rounded up. Not a routing engine.
pub fn eta_minutes(distance_km: f64, minutes_per_km: f64) -> i64 {
    (distance_km * minutes_per_km).ceil() as i64
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{eta_minutes, nearest_partner};
    use crate::error::AppError;
    use crate::models::partner::{DeliveryPartner, GeoPoint};

    fn partner(id_seed: u128, lat: f64, lng: f64) -> DeliveryPartner {
        DeliveryPartner {
            id: Uuid::from_u128(id_seed),
            full_name: format!("partner-{id_seed}"),
            location: GeoPoint { lat, lng },
            is_occupied: false,
        }
    }

    #[test]
    fn picks_the_nearest_partner() {
        let partners = vec![partner(1, 1.0, 1.0), partner(2, 0.0, 0.0)];
        let source = GeoPoint { lat: 0.0, lng: 0.0 };

        let selection = nearest_partner(&partners, &source).unwrap();

        assert_eq!(selection.partner.id, Uuid::from_u128(2));
        assert!(selection.distance_km < 1e-9);
    }

    #[test]
    fn tie_goes_to_first_in_input_order() {
        let partners = vec![partner(1, 1.0, 0.0), partner(2, -1.0, 0.0)];
        let source = GeoPoint { lat: 0.0, lng: 0.0 };

        let selection = nearest_partner(&partners, &source).unwrap();

        assert_eq!(selection.partner.id, Uuid::from_u128(1));
    }

    #[test]
    fn empty_set_fails_with_no_partners() {
        let source = GeoPoint { lat: 0.0, lng: 0.0 };
        let result = nearest_partner(&[], &source);

        assert!(matches!(result, Err(AppError::NoPartnersAvailable)));
    }

    #[test]
    fn eta_rounds_up_to_whole_minutes() {
        assert_eq!(eta_minutes(1.2, 2.0), 3);
        assert_eq!(eta_minutes(5.0, 2.0), 10);
        assert_eq!(eta_minutes(0.0, 2.0), 0);
    }
}
