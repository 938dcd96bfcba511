//! Fixed-shape KML documents for the update protocol.
//!
//! Documents are plain records rendered by [`KmlWriter`], which owns
//! indentation, escaping and number formatting. Positions are always written
//! with six fractional digits and a `.` separator; ranges and tilts use the
//! shortest round-trip form (`3500000`, `0`).

use std::fmt::Write as _;

use foundation::LonLat;

use crate::catalog::Waypoint;
use crate::token::Token;

pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// Id given to the placemark's `<Point>` by the initial document.
pub const STABLE_POINT_ID: &str = "pt0";

/// `<NetworkLinkControl>`: directives applied to the enclosing NetworkLink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkLinkControl {
    pub min_refresh_period: Option<u32>,
    pub message: Option<String>,
    pub cookie: Option<Token>,
    pub update: Option<Update>,
    pub look_at: Option<LookAt>,
}

/// `<Update>` targeting a previously loaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub target_href: String,
    pub changes: Vec<PointChange>,
}

/// `<Change><Point targetId=..>` moving one point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointChange {
    pub target_id: String,
    pub position: LonLat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookAt {
    pub position: LonLat,
    pub range: f64,
    pub tilt: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: String,
    pub position: LonLat,
}

/// Colors are KML `aabbggrr` hex strings.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacemarkStyle {
    pub label_color: String,
    pub icon_color: String,
    pub icon_href: String,
    pub balloon_bg_color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    pub name: String,
    pub style: Option<PlacemarkStyle>,
    pub point: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub href: String,
    pub refresh_interval: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkLink {
    pub name: String,
    pub fly_to_view: bool,
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Placemark(Placemark),
    NetworkLink(NetworkLink),
}

/// Either a bare feature list or one wrapped in `<Document>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub document_name: Option<String>,
    pub features: Vec<Feature>,
}

/// A complete `<kml>` response body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KmlDocument {
    pub control: Option<NetworkLinkControl>,
    pub container: Option<Container>,
}

impl KmlDocument {
    pub fn render(&self) -> String {
        let mut w = KmlWriter::default();
        w.open_attr("kml", "xmlns", KML_NAMESPACE);
        if let Some(control) = &self.control {
            write_control(&mut w, control);
        }
        if let Some(container) = &self.container {
            write_container(&mut w, container);
        }
        w.close("kml");
        w.finish()
    }
}

/// Document that creates the placemark later moved by updates.
pub fn initial_document(min_refresh_period: u32, icon_url: &str) -> KmlDocument {
    KmlDocument {
        control: Some(NetworkLinkControl {
            min_refresh_period: Some(min_refresh_period),
            cookie: Some(Token::INITIAL),
            ..NetworkLinkControl::default()
        }),
        container: Some(Container {
            document_name: None,
            features: vec![Feature::Placemark(Placemark {
                name: "Moving point".to_string(),
                style: Some(PlacemarkStyle {
                    label_color: "ffffff00".to_string(),
                    icon_color: "ffff7f00".to_string(),
                    icon_href: icon_url.to_string(),
                    balloon_bg_color: "ff223344".to_string(),
                }),
                point: Point {
                    id: STABLE_POINT_ID.to_string(),
                    position: LonLat::new(0.0, 0.0),
                },
            })],
        }),
    }
}

/// Update that moves `stable_id` and the camera to `waypoint`.
pub fn update_document(
    min_refresh_period: u32,
    waypoint: &Waypoint,
    token: Token,
    target_href: &str,
    stable_id: &str,
) -> KmlDocument {
    KmlDocument {
        control: Some(NetworkLinkControl {
            min_refresh_period: Some(min_refresh_period),
            message: Some(format!("Arriving {}", waypoint.name)),
            cookie: Some(token),
            update: Some(Update {
                target_href: target_href.to_string(),
                changes: vec![PointChange {
                    target_id: stable_id.to_string(),
                    position: waypoint.position,
                }],
            }),
            look_at: Some(LookAt {
                position: waypoint.position,
                range: waypoint.view_range,
                tilt: None,
            }),
        }),
        container: None,
    }
}

pub fn render_initial(min_refresh_period: u32, icon_url: &str) -> String {
    initial_document(min_refresh_period, icon_url).render()
}

pub fn render_update(
    min_refresh_period: u32,
    waypoint: &Waypoint,
    token: Token,
    target_href: &str,
    stable_id: &str,
) -> String {
    update_document(min_refresh_period, waypoint, token, target_href, stable_id).render()
}

fn write_control(w: &mut KmlWriter, c: &NetworkLinkControl) {
    w.open("NetworkLinkControl");
    if let Some(period) = c.min_refresh_period {
        w.leaf("minRefreshPeriod", &period.to_string());
    }
    if let Some(message) = &c.message {
        w.leaf("message", message);
    }
    if let Some(cookie) = c.cookie {
        w.leaf("cookie", &cookie.directive());
    }
    if let Some(update) = &c.update {
        w.open("Update");
        w.leaf("targetHref", &update.target_href);
        for change in &update.changes {
            w.open("Change");
            w.open_attr("Point", "targetId", &change.target_id);
            w.leaf("coordinates", &coordinates(change.position));
            w.close("Point");
            w.close("Change");
        }
        w.close("Update");
    }
    if let Some(look_at) = &c.look_at {
        w.open("LookAt");
        w.leaf("longitude", &degrees(look_at.position.lon_deg));
        w.leaf("latitude", &degrees(look_at.position.lat_deg));
        w.leaf("range", &look_at.range.to_string());
        if let Some(tilt) = look_at.tilt {
            w.leaf("tilt", &tilt.to_string());
        }
        w.close("LookAt");
    }
    w.close("NetworkLinkControl");
}

fn write_container(w: &mut KmlWriter, c: &Container) {
    if let Some(name) = &c.document_name {
        w.open("Document");
        w.leaf("name", name);
        w.leaf("open", "1");
    }
    for feature in &c.features {
        match feature {
            Feature::Placemark(p) => write_placemark(w, p),
            Feature::NetworkLink(n) => write_network_link(w, n),
        }
    }
    if c.document_name.is_some() {
        w.close("Document");
    }
}

fn write_placemark(w: &mut KmlWriter, p: &Placemark) {
    w.open("Placemark");
    w.leaf("name", &p.name);
    if let Some(style) = &p.style {
        w.open("Style");
        w.open("LabelStyle");
        w.leaf("color", &style.label_color);
        w.close("LabelStyle");
        w.open("IconStyle");
        w.leaf("color", &style.icon_color);
        w.open("Icon");
        w.leaf("href", &style.icon_href);
        w.close("Icon");
        w.close("IconStyle");
        w.open("BalloonStyle");
        w.leaf("bgColor", &style.balloon_bg_color);
        w.close("BalloonStyle");
        w.close("Style");
    }
    w.open_attr("Point", "id", &p.point.id);
    w.leaf("coordinates", &coordinates(p.point.position));
    w.close("Point");
    w.close("Placemark");
}

fn write_network_link(w: &mut KmlWriter, n: &NetworkLink) {
    w.open("NetworkLink");
    w.leaf("name", &n.name);
    w.leaf("flyToView", if n.fly_to_view { "1" } else { "0" });
    w.open("Link");
    w.leaf("href", &n.link.href);
    match n.link.refresh_interval {
        Some(secs) => {
            w.leaf("refreshMode", "onInterval");
            w.leaf("refreshInterval", &secs.to_string());
        }
        None => w.leaf("refreshMode", "onChange"),
    }
    w.close("Link");
    w.close("NetworkLink");
}

/// `<lon>,<lat>` with fixed precision.
pub fn coordinates(p: LonLat) -> String {
    format!("{},{}", degrees(p.lon_deg), degrees(p.lat_deg))
}

fn degrees(v: f64) -> String {
    format!("{v:.6}")
}

/// Escapes markup-reserved characters in text and attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Line-oriented XML writer with two-space indentation.
#[derive(Default)]
struct KmlWriter {
    out: String,
    depth: usize,
}

impl KmlWriter {
    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    fn open(&mut self, tag: &str) {
        self.indent();
        let _ = writeln!(self.out, "<{tag}>");
        self.depth += 1;
    }

    fn open_attr(&mut self, tag: &str, attr: &str, value: &str) {
        self.indent();
        let _ = writeln!(self.out, "<{tag} {attr}=\"{}\">", escape(value));
        self.depth += 1;
    }

    fn leaf(&mut self, tag: &str, text: &str) {
        self.indent();
        let _ = writeln!(self.out, "<{tag}>{}</{tag}>", escape(text));
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        let _ = writeln!(self.out, "</{tag}>");
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn australia() -> Waypoint {
        Waypoint::new("Australia", 134.6, -20.47, 3_500_000.0)
    }

    #[test]
    fn initial_document_shape() {
        let body = render_initial(7, "http://example.com/flag.png");
        let expected = r#"<kml xmlns="http://www.opengis.net/kml/2.2">
  <NetworkLinkControl>
    <minRefreshPeriod>7</minRefreshPeriod>
    <cookie>count=0</cookie>
  </NetworkLinkControl>
  <Placemark>
    <name>Moving point</name>
    <Style>
      <LabelStyle>
        <color>ffffff00</color>
      </LabelStyle>
      <IconStyle>
        <color>ffff7f00</color>
        <Icon>
          <href>http://example.com/flag.png</href>
        </Icon>
      </IconStyle>
      <BalloonStyle>
        <bgColor>ff223344</bgColor>
      </BalloonStyle>
    </Style>
    <Point id="pt0">
      <coordinates>0.000000,0.000000</coordinates>
    </Point>
  </Placemark>
</kml>
"#;
        assert_eq!(body, expected);
    }

    #[test]
    fn update_document_shape() {
        let body = render_update(
            7,
            &australia(),
            Token(1),
            "http://localhost/cgi-bin/continents",
            STABLE_POINT_ID,
        );
        let expected = r#"<kml xmlns="http://www.opengis.net/kml/2.2">
  <NetworkLinkControl>
    <minRefreshPeriod>7</minRefreshPeriod>
    <message>Arriving Australia</message>
    <cookie>count=1</cookie>
    <Update>
      <targetHref>http://localhost/cgi-bin/continents</targetHref>
      <Change>
        <Point targetId="pt0">
          <coordinates>134.600000,-20.470000</coordinates>
        </Point>
      </Change>
    </Update>
    <LookAt>
      <longitude>134.600000</longitude>
      <latitude>-20.470000</latitude>
      <range>3500000</range>
    </LookAt>
  </NetworkLinkControl>
</kml>
"#;
        assert_eq!(body, expected);
    }

    #[test]
    fn rendering_is_byte_identical_across_calls() {
        let a = render_update(7, &australia(), Token(1), "http://h/x", "pt0");
        let b = render_update(7, &australia(), Token(1), "http://h/x", "pt0");
        assert_eq!(a, b);
    }

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(escape(r#"A&B <C> "d" 'e'"#), "A&amp;B &lt;C&gt; &quot;d&quot; &apos;e&apos;");
        let wp = Waypoint::new("Trinidad & Tobago", -61.2, 10.7, 200_000.0);
        let body = render_update(7, &wp, Token(2), "http://h/x?a=1&b=2", "pt0");
        assert!(body.contains("<message>Arriving Trinidad &amp; Tobago</message>"));
        assert!(body.contains("<targetHref>http://h/x?a=1&amp;b=2</targetHref>"));
    }

    #[test]
    fn network_link_document() {
        let doc = KmlDocument {
            control: None,
            container: Some(Container {
                document_name: Some("Document".to_string()),
                features: vec![Feature::NetworkLink(NetworkLink {
                    name: "Update Link".to_string(),
                    fly_to_view: true,
                    link: Link {
                        href: "http://localhost:8080/update".to_string(),
                        refresh_interval: Some(4),
                    },
                })],
            }),
        };
        let body = doc.render();
        let expected = r#"<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Document</name>
    <open>1</open>
    <NetworkLink>
      <name>Update Link</name>
      <flyToView>1</flyToView>
      <Link>
        <href>http://localhost:8080/update</href>
        <refreshMode>onInterval</refreshMode>
        <refreshInterval>4</refreshInterval>
      </Link>
    </NetworkLink>
  </Document>
</kml>
"#;
        assert_eq!(body, expected);
    }

    #[test]
    fn number_formatting_is_fixed() {
        assert_eq!(coordinates(LonLat::new(-122.0, 37.5)), "-122.000000,37.500000");
        assert_eq!(coordinates(LonLat::new(102.0, 33.7)), "102.000000,33.700000");
        let look = LookAt {
            position: LonLat::new(0.0, 0.0),
            range: 10_000.0,
            tilt: Some(0.0),
        };
        let body = KmlDocument {
            control: Some(NetworkLinkControl {
                look_at: Some(look),
                ..NetworkLinkControl::default()
            }),
            container: None,
        }
        .render();
        assert!(body.contains("<range>10000</range>"));
        assert!(body.contains("<tilt>0</tilt>"));
    }
}
