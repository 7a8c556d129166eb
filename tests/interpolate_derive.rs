use canopy::prelude::*;

#[derive(Clone, Debug, PartialEq, Interpolate)]
struct Glow {
    radius: f32,
    colour: Color,
    offset: Vector2,
    #[interpolate(skip)]
    layer: u8,
}

#[derive(Clone, Debug, PartialEq, Interpolate)]
struct Pair(f32, f64);

#[test]
fn test_named_fields_interpolate() {
    let from = Glow {
        radius: 0.0,
        colour: Color::BLACK,
        offset: Vector2::new(0.0, 10.0),
        layer: 1,
    };
    let to = Glow {
        radius: 8.0,
        colour: Color::WHITE,
        offset: Vector2::new(10.0, 0.0),
        layer: 9,
    };
    let mid = Glow::interpolate(&from, &to, 0.5);
    assert_eq!(mid.radius, 4.0);
    assert_eq!(mid.colour, Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(mid.offset, Vector2::new(5.0, 5.0));
    assert_eq!(mid.layer, 1);
}

#[test]
fn test_tuple_struct_interpolates() {
    let value = Pair::interpolate(&Pair(0.0, 0.0), &Pair(2.0, 4.0), 0.25);
    assert_eq!(value, Pair(0.5, 1.0));
}

#[test]
fn test_derived_type_drives_a_tween() {
    let mut tween = Tween::to(Pair(10.0, 10.0));
    assert_eq!(tween.start, None);
    tween.start = Some(Pair(0.0, 0.0));
    let value = Pair::interpolate(tween.start.as_ref().unwrap(), &tween.end, 1.0);
    assert_eq!(value, tween.end);
}
