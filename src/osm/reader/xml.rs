// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;
use std::str::from_utf8;

use quick_xml::events::{BytesStart, Event};

use super::element::{self, Element};
use crate::Bounds;

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
pub(super) trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
pub(super) struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> IoParser<R> {
    #[inline]
    fn new(reader: R) -> Self {
        Self(quick_xml::Reader::from_reader(reader), Vec::default())
    }
}

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>> {
        self.1.clear();
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
pub(super) struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> BufParser<'a> {
    #[inline]
    fn new(data: &'a [u8]) -> Self {
        Self(quick_xml::Reader::from_reader(data))
    }
}

impl<'a> Parser for BufParser<'a> {
    #[inline]
    fn read_event<'b>(&'b mut self) -> quick_xml::Result<Event<'b>> {
        self.0.read_event()
    }
}

/// Reader streams [Elements](Element) from an OSM XML document.
pub(super) struct Reader<P: Parser> {
    parser: P,
    eof: bool,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self { parser, eof: false }
    }
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<Element, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut e: Option<Element> = None;

        while !self.eof {
            let event = match self.parser.read_event() {
                Ok(e) => e,
                Err(e) => return Some(Err(e)),
            };

            match event {
                Event::Empty(start) => match start.local_name().as_ref() {
                    b"bounds" => match parse_bounds(&start) {
                        Some(b) => return Some(Ok(Element::Bounds(b))),
                        None => log::warn!("malformed <bounds> element"),
                    },
                    b"node" => match parse_node(&start) {
                        Some(n) => return Some(Ok(Element::Node(n))),
                        None => log::warn!("malformed <node> element"),
                    },
                    // "way" or "relation" can't be self-closing
                    b"tag" => {
                        if let Some(tags) = element_tags(&mut e) {
                            if let Some((k, v)) = parse_tag(&start) {
                                tags.insert(k, v);
                            }
                        }
                    }
                    b"nd" => {
                        if let Some(nodes) = element_nodes(&mut e) {
                            match parse_nd(&start) {
                                Some(ref_) => nodes.push(ref_),
                                None => log::debug!("malformed <nd> element"),
                            }
                        }
                    }
                    b"member" => {
                        if let Some(members) = element_members(&mut e) {
                            match parse_member(&start) {
                                Some(member) => members.push(member),
                                None => log::debug!("malformed <member> element"),
                            }
                        }
                    }
                    _ => {}
                },

                Event::Start(start) => match start.local_name().as_ref() {
                    b"node" => {
                        e = parse_node(&start).map(Element::Node);
                        if e.is_none() {
                            log::warn!("malformed <node> element");
                        }
                    }
                    b"way" => {
                        e = parse_way(&start).map(Element::Way);
                        if e.is_none() {
                            log::warn!("malformed <way> element");
                        }
                    }
                    b"relation" => {
                        e = parse_relation(&start).map(Element::Relation);
                        if e.is_none() {
                            log::warn!("malformed <relation> element");
                        }
                    }
                    // "tag", "nd" and "member" must be self-closing
                    _ => {}
                },

                Event::End(end) => match end.local_name().as_ref() {
                    b"node" | b"way" | b"relation" => {
                        if let Some(e) = e.take() {
                            return Some(Ok(e));
                        }
                    }
                    _ => {}
                },

                Event::Eof => {
                    self.eof = true;
                }

                _ => {}
            }
        }

        e.map(Ok)
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    pub(super) fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser::new(data))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    pub(super) fn from_io(reader: R) -> Self {
        Self::new(IoParser::new(reader))
    }
}

fn parse_attr<T: std::str::FromStr>(value: &[u8]) -> Option<T> {
    from_utf8(value).ok()?.parse().ok()
}

fn parse_bounds(start: &BytesStart<'_>) -> Option<Bounds> {
    let mut b = Bounds {
        min_lat: f64::NAN,
        max_lat: f64::NAN,
        min_lon: f64::NAN,
        max_lon: f64::NAN,
    };

    for attr in start.attributes() {
        let attr = attr.ok()?;
        match attr.key.as_ref() {
            b"minlat" => b.min_lat = parse_attr(&attr.value)?,
            b"maxlat" => b.max_lat = parse_attr(&attr.value)?,
            b"minlon" => b.min_lon = parse_attr(&attr.value)?,
            b"maxlon" => b.max_lon = parse_attr(&attr.value)?,
            _ => {}
        }
    }

    // Validity of the values is checked by the projection
    Some(b)
}

fn parse_node(start: &BytesStart<'_>) -> Option<element::Node> {
    let mut id: i64 = 0;
    let mut lat = f64::NAN;
    let mut lon = f64::NAN;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        match attr.key.as_ref() {
            b"id" => id = parse_attr(&attr.value)?,
            b"lat" => lat = parse_attr(&attr.value)?,
            b"lon" => lon = parse_attr(&attr.value)?,
            _ => {}
        }
    }

    if id != 0 && lat.is_finite() && lon.is_finite() {
        Some(element::Node { id, lat, lon })
    } else {
        None
    }
}

fn parse_id(start: &BytesStart<'_>) -> Option<i64> {
    let mut id: i64 = 0;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        if attr.key.as_ref() == b"id" {
            id = parse_attr(&attr.value)?;
        }
    }

    if id != 0 {
        Some(id)
    } else {
        None
    }
}

fn parse_way(start: &BytesStart<'_>) -> Option<element::Way> {
    parse_id(start).map(|id| element::Way {
        id,
        nodes: Vec::default(),
        tags: HashMap::default(),
    })
}

fn parse_relation(start: &BytesStart<'_>) -> Option<element::Relation> {
    parse_id(start).map(|id| element::Relation {
        id,
        members: Vec::default(),
        tags: HashMap::default(),
    })
}

fn parse_tag(start: &BytesStart<'_>) -> Option<(String, String)> {
    let mut k = None;
    let mut v = None;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        match attr.key.as_ref() {
            b"k" => k = Some(attr.unescape_value().ok()?.into_owned()),
            b"v" => v = Some(attr.unescape_value().ok()?.into_owned()),
            _ => {}
        }
    }

    k.map(|k| (k, v.unwrap_or_default()))
}

fn parse_nd(start: &BytesStart<'_>) -> Option<i64> {
    let mut ref_: i64 = 0;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        if attr.key.as_ref() == b"ref" {
            ref_ = parse_attr(&attr.value)?;
        }
    }

    if ref_ != 0 {
        Some(ref_)
    } else {
        None
    }
}

fn parse_member(start: &BytesStart<'_>) -> Option<element::RelationMember> {
    let mut ref_: i64 = 0;
    let mut type_ = None;
    let mut role = None;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        match attr.key.as_ref() {
            b"ref" => ref_ = parse_attr(&attr.value)?,
            b"type" => type_ = Some(parse_element_type(&attr.value)?),
            b"role" => role = Some(attr.unescape_value().ok()?.into_owned()),
            _ => {}
        }
    }

    match (ref_, type_) {
        (0, _) => None,
        (ref_, Some(type_)) => Some(element::RelationMember {
            type_,
            ref_,
            role: role.unwrap_or_default(),
        }),
        _ => None,
    }
}

fn parse_element_type(s: &[u8]) -> Option<element::ElementType> {
    match s {
        b"node" => Some(element::ElementType::Node),
        b"way" => Some(element::ElementType::Way),
        b"relation" => Some(element::ElementType::Relation),
        _ => None,
    }
}

fn element_tags(e: &mut Option<Element>) -> Option<&mut HashMap<String, String>> {
    match e {
        Some(Element::Way(ref mut w)) => Some(&mut w.tags),
        Some(Element::Relation(ref mut r)) => Some(&mut r.tags),
        _ => None,
    }
}

fn element_nodes(e: &mut Option<Element>) -> Option<&mut Vec<i64>> {
    match e {
        Some(Element::Way(ref mut w)) => Some(&mut w.nodes),
        _ => None,
    }
}

fn element_members(e: &mut Option<Element>) -> Option<&mut Vec<element::RelationMember>> {
    match e {
        Some(Element::Relation(ref mut r)) => Some(&mut r.members),
        _ => None,
    }
}
