use std::collections::BTreeMap;

use crate::models::{Component, Scalar};

const SEED_SIZE: usize = 5;

/// The fixed starter catalog, in display order.
pub fn seed_components() -> Vec<Component> {
    let components = vec![
        component(
            "comp_1",
            "Arduino Uno",
            "Microcontrollers",
            "Popular microcontroller board based on ATmega328P",
            450.0,
            [
                ("microcontroller", Scalar::from("ATmega328P")),
                ("operating_voltage", Scalar::from("5V")),
                ("digital_pins", Scalar::from(14)),
                ("analog_pins", Scalar::from(6)),
            ],
        ),
        component(
            "comp_2",
            "Servo Motor SG90",
            "Motors",
            "Micro servo motor for robotics projects",
            150.0,
            [
                ("torque", Scalar::from("1.8 kg-cm")),
                ("speed", Scalar::from("0.1 sec/60°")),
                ("voltage", Scalar::from("4.8V-6V")),
            ],
        ),
        component(
            "comp_3",
            "Ultrasonic Sensor HC-SR04",
            "Sensors",
            "Distance measuring sensor using ultrasonic waves",
            120.0,
            [
                ("range", Scalar::from("2cm-400cm")),
                ("accuracy", Scalar::from("3mm")),
                ("voltage", Scalar::from("5V")),
            ],
        ),
        component(
            "comp_4",
            "LED Strip WS2812B",
            "Display",
            "Addressable RGB LED strip",
            300.0,
            [
                ("leds_per_meter", Scalar::from(60)),
                ("voltage", Scalar::from("5V")),
                ("power_consumption", Scalar::from("18W/m")),
            ],
        ),
        component(
            "comp_5",
            "ESP32 DevKit",
            "Microcontrollers",
            "WiFi and Bluetooth enabled microcontroller",
            550.0,
            [
                ("cpu", Scalar::from("Dual-core 240MHz")),
                ("memory", Scalar::from("520KB RAM")),
                ("wifi", Scalar::from("802.11 b/g/n")),
                ("bluetooth", Scalar::from("v4.2 BR/EDR and BLE")),
            ],
        ),
    ];

    debug_assert_eq!(components.len(), SEED_SIZE);
    components
}

fn component<const N: usize>(
    id: &str,
    name: &str,
    category: &str,
    description: &str,
    price: f64,
    specifications: [(&str, Scalar); N],
) -> Component {
    Component {
        id: Some(id.to_string()),
        name: name.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        price,
        availability: "Available".to_string(),
        image_url: None,
        specifications: Some(
            specifications
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect::<BTreeMap<_, _>>(),
        ),
        created_at: None,
    }
}
