//! Read-only JSON snapshots of traced scenes.

use refract::{Color, Ray, TraceConfig, TracePass, TraceStats};

use std::{rc::Rc, sync::Arc};

use core::ops::Deref;

pub use serde_json;

pub trait JsonSer {
    /// Serialize `self` into a JSON object.
    fn to_json(&self) -> serde_json::Value;
}

impl<T: JsonSer> JsonSer for [T] {
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(Vec::from_iter(self.iter().map(T::to_json)))
    }
}

impl<const N: usize, T: JsonSer> JsonSer for [T; N] {
    fn to_json(&self) -> serde_json::Value {
        self.as_slice().to_json()
    }
}

// It's clear that all these impls use the `Deref` trait, but writing a blanket impl over all
// types implementing `Deref` makes the trait unusable downstream

impl<T: JsonSer + ?Sized> JsonSer for Box<T> {
    fn to_json(&self) -> serde_json::Value {
        self.deref().to_json()
    }
}

impl<T: JsonSer + ?Sized> JsonSer for Arc<T> {
    fn to_json(&self) -> serde_json::Value {
        self.deref().to_json()
    }
}

impl<T: JsonSer + ?Sized> JsonSer for Rc<T> {
    fn to_json(&self) -> serde_json::Value {
        self.deref().to_json()
    }
}

impl<T: JsonSer> JsonSer for Vec<T> {
    fn to_json(&self) -> serde_json::Value {
        self.deref().to_json()
    }
}

impl<'a, T: JsonSer + ?Sized> JsonSer for &'a T {
    fn to_json(&self) -> serde_json::Value {
        (*self).to_json()
    }
}

impl JsonSer for Color {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "rgb": self.rgb,
            "intensity": self.intensity,
        })
    }
}

impl JsonSer for Ray {
    /// The whole tree rooted at `self`. `end` is `null` for rays that were never propagated.
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "origin": self.origin.as_slice(),
            "direction": self.dir.as_ref().as_slice(),
            "end": self.end.as_ref().map(|end| end.as_slice()),
            "color": self.color.to_json(),
            "children": self.children.to_json(),
        })
    }
}

impl JsonSer for TraceStats {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "nodes": self.nodes,
            "hits": self.hits,
            "escaped": self.escaped,
            "absorbed": self.absorbed,
            "pruned": self.pruned,
            "truncated": self.truncated,
            "faults": self.faults,
        })
    }
}

impl JsonSer for TracePass {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "warning": self.warning,
            "stats": self.stats.to_json(),
            "trees": self.trees.to_json(),
        })
    }
}

impl JsonSer for TraceConfig {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "half_width": self.half_width,
            "self_hit_eps_sq": self.self_hit_eps_sq,
            "min_intensity": self.min_intensity,
            "max_depth": self.max_depth,
        })
    }
}

/// A snapshot of a finished trace pass, along with the configuration it ran with.
pub fn serialize_trace(config: &TraceConfig, pass: &TracePass) -> serde_json::Value {
    serde_json::json!({
        "config": config.to_json(),
        "pass": pass.to_json(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract::{geometry::Vector, trace_pass, Contact, Emission, Optic, Patch, RaySource};

    /// Sends every ray straight back at `x = 10`.
    struct Wall;

    impl Optic for Wall {
        fn add_contacts(&self, ctx: &mut refract::CollisionCtx) {
            let probe = *ctx.probe();
            if probe.dir.x > 0. && probe.origin.x < 10. {
                let t = (10. - probe.origin.x) / probe.dir.x;
                ctx.add_contact(probe.at(t), Patch::Whole);
            }
        }

        fn return_ray(&self, ray: &Ray, contact: &Contact) -> refract::Result<Emission> {
            let mut emission = Emission::new();
            emission.push(ray.spawn(contact.point, -ray.dir, ray.color));
            Ok(emission)
        }
    }

    fn wall_pass(config: &TraceConfig) -> TracePass {
        let source = RaySource::new(Vector::zeros(), Vector::x(), Color::WHITE).unwrap();
        trace_pass(&[Wall], &[source], config).unwrap()
    }

    #[test]
    fn ray_trees_nest() {
        let json = wall_pass(&TraceConfig::default()).to_json();

        assert_eq!(json["warning"], false);
        assert_eq!(json["stats"]["hits"], 1);
        assert_eq!(json["stats"]["escaped"], 1);

        let root = &json["trees"][0][0];
        assert_eq!(root["origin"], serde_json::json!([0., 0.]));
        assert_eq!(root["end"], serde_json::json!([10., 0.]));
        assert_eq!(root["color"]["intensity"], 1.);

        let back = &root["children"][0];
        assert_eq!(back["direction"], serde_json::json!([-1., 0.]));
        assert_eq!(back["children"], serde_json::json!([]));
    }

    #[test]
    fn unpropagated_rays_have_no_end() {
        let ray = Ray::new([1., 2.], [0., 1.], Color::WHITE).unwrap();
        let json = ray.to_json();
        assert!(json["end"].is_null());
        assert_eq!(json["direction"], serde_json::json!([0., 1.]));
        assert_eq!(json["color"]["rgb"], serde_json::json!([1., 1., 1.]));
    }

    #[test]
    fn snapshots_hold_config_and_pass() {
        let config = TraceConfig::default().with_max_depth(None);
        let pass = wall_pass(&config);
        let json = serialize_trace(&config, &pass);

        assert!(json["config"]["max_depth"].is_null());
        assert_eq!(json["config"]["half_width"], config.half_width);
        assert_eq!(json["pass"], pass.to_json());
    }
}
