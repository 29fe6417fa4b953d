use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::reference::ReferenceKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub email: String,
}

/// Latest known position of a shipment, overwritten on every status update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusSnapshot {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: Option<Uuid>,
    pub status: Option<Uuid>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shipment {
    pub id: Uuid,
    pub tracking_number: String,
    pub shipper: Contact,
    pub receiver: Contact,
    pub shipment_type: Option<Uuid>,
    pub courier: Option<Uuid>,
    pub weight_kg: Decimal,
    pub package_count: i32,
    pub mode: Option<Uuid>,
    pub product: Option<Uuid>,
    pub quantity: i32,
    pub total_freight: String,
    pub payment_mode: Option<Uuid>,
    pub carrier: Option<Uuid>,
    pub carrier_reference_no: Option<String>,
    pub origin: Option<Uuid>,
    pub destination: Option<Uuid>,
    pub departure_time: NaiveTime,
    pub pickup_time: NaiveTime,
    pub pickup_date: NaiveDate,
    pub expected_delivery_date: NaiveDate,
    pub comments: Option<String>,
    pub current_status: StatusSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    /// Every reference this shipment points at, paired with the list it must
    /// come from.
    pub fn references(&self) -> Vec<(ReferenceKind, Uuid)> {
        let slots = [
            (ReferenceKind::ShipmentType, self.shipment_type),
            (ReferenceKind::Courier, self.courier),
            (ReferenceKind::Mode, self.mode),
            (ReferenceKind::Product, self.product),
            (ReferenceKind::PaymentMode, self.payment_mode),
            (ReferenceKind::Carrier, self.carrier),
            (ReferenceKind::Country, self.origin),
            (ReferenceKind::Country, self.destination),
            (ReferenceKind::Country, self.current_status.location),
            (ReferenceKind::StatusType, self.current_status.status),
        ];

        slots
            .into_iter()
            .filter_map(|(kind, id)| id.map(|id| (kind, id)))
            .collect()
    }

    /// Drops every pointer to a deleted reference entry. Returns whether
    /// anything changed.
    pub fn clear_reference(&mut self, kind: ReferenceKind, id: Uuid) -> bool {
        let slots: Vec<&mut Option<Uuid>> = match kind {
            ReferenceKind::ShipmentType => vec![&mut self.shipment_type],
            ReferenceKind::Courier => vec![&mut self.courier],
            ReferenceKind::Mode => vec![&mut self.mode],
            ReferenceKind::Product => vec![&mut self.product],
            ReferenceKind::PaymentMode => vec![&mut self.payment_mode],
            ReferenceKind::Carrier => vec![&mut self.carrier],
            ReferenceKind::Country => vec![
                &mut self.origin,
                &mut self.destination,
                &mut self.current_status.location,
            ],
            ReferenceKind::StatusType => vec![&mut self.current_status.status],
            ReferenceKind::PieceType => Vec::new(),
        };

        let mut changed = false;
        for slot in slots {
            if *slot == Some(id) {
                *slot = None;
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, NaiveTime, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::{Contact, Shipment, StatusSnapshot};

    pub fn contact(name: &str) -> Contact {
        Contact {
            name: name.to_string(),
            phone: "+1 555 0100".to_string(),
            address: "1 Main St".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    pub fn shipment(tracking_number: &str) -> Shipment {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();

        Shipment {
            id: Uuid::new_v4(),
            tracking_number: tracking_number.to_string(),
            shipper: contact("Alice"),
            receiver: contact("Bob"),
            shipment_type: None,
            courier: None,
            weight_kg: Decimal::new(1250, 2),
            package_count: 1,
            mode: None,
            product: None,
            quantity: 1,
            total_freight: "120.00".to_string(),
            payment_mode: None,
            carrier: None,
            carrier_reference_no: None,
            origin: None,
            destination: None,
            departure_time: time,
            pickup_time: time,
            pickup_date: date,
            expected_delivery_date: date,
            comments: None,
            current_status: StatusSnapshot {
                date,
                time,
                location: None,
                status: None,
                remarks: None,
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::fixtures::shipment;
    use crate::models::reference::ReferenceKind;

    #[test]
    fn clearing_a_country_drops_every_country_slot() {
        let country = Uuid::new_v4();
        let mut s = shipment("ABC123");
        s.origin = Some(country);
        s.destination = Some(country);
        s.current_status.location = Some(country);

        assert!(s.clear_reference(ReferenceKind::Country, country));
        assert!(s.origin.is_none());
        assert!(s.destination.is_none());
        assert!(s.current_status.location.is_none());
    }

    #[test]
    fn clearing_an_unrelated_id_changes_nothing() {
        let carrier = Uuid::new_v4();
        let mut s = shipment("ABC123");
        s.carrier = Some(carrier);

        assert!(!s.clear_reference(ReferenceKind::Carrier, Uuid::new_v4()));
        assert!(!s.clear_reference(ReferenceKind::Courier, carrier));
        assert_eq!(s.carrier, Some(carrier));
    }

    #[test]
    fn references_lists_only_set_slots() {
        let carrier = Uuid::new_v4();
        let status = Uuid::new_v4();
        let mut s = shipment("ABC123");
        s.carrier = Some(carrier);
        s.current_status.status = Some(status);

        let refs = s.references();
        assert_eq!(refs.len(), 2);
        assert!(refs.contains(&(ReferenceKind::Carrier, carrier)));
        assert!(refs.contains(&(ReferenceKind::StatusType, status)));
    }
}
