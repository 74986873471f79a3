//! The render-time helper library.
//!
//! Compiled templates call a small set of helpers (`pug.escape`,
//! `pug.attrs`, ...). With runtime inlining the generator instead records
//! each helper it uses, and [`build`] emits their minified sources ahead
//! of the template function, together with everything they depend on.
//!
//! The same helpers are also implemented natively ([`native`]) so the
//! constant folder can evaluate calls like `pug.attr("id", "x", true, true)`
//! while compiling.

use std::collections::BTreeSet;

pub mod native;

/// A runtime helper. Declaration order is the order [`build`] emits them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Helper {
    Attr,
    Attrs,
    Classes,
    ClassesArray,
    ClassesObject,
    Escape,
    HasOwnProperty,
    MatchHtml,
    Merge,
    Rethrow,
    Style,
}

impl Helper {
    /// Helpers a template may reference through the `pug` object.
    pub const PUBLIC: [Helper; 7] = [
        Helper::Merge,
        Helper::Classes,
        Helper::Style,
        Helper::Attr,
        Helper::Attrs,
        Helper::Escape,
        Helper::Rethrow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Helper::Attr => "attr",
            Helper::Attrs => "attrs",
            Helper::Classes => "classes",
            Helper::ClassesArray => "classes_array",
            Helper::ClassesObject => "classes_object",
            Helper::Escape => "escape",
            Helper::HasOwnProperty => "has_own_property",
            Helper::MatchHtml => "match_html",
            Helper::Merge => "merge",
            Helper::Rethrow => "rethrow",
            Helper::Style => "style",
        }
    }

    pub fn is_public(self) -> bool {
        Helper::PUBLIC.contains(&self)
    }

    /// Helpers whose definitions this one's source refers to.
    fn dependencies(self) -> &'static [Helper] {
        match self {
            Helper::Merge => &[Helper::Style],
            Helper::ClassesArray => &[Helper::Classes, Helper::Escape],
            Helper::ClassesObject | Helper::Style => &[Helper::HasOwnProperty],
            Helper::Classes => &[Helper::ClassesArray, Helper::ClassesObject],
            Helper::Attr => &[Helper::Escape],
            Helper::Attrs => &[
                Helper::Attr,
                Helper::Classes,
                Helper::HasOwnProperty,
                Helper::Style,
            ],
            Helper::Escape => &[Helper::MatchHtml],
            Helper::HasOwnProperty | Helper::MatchHtml | Helper::Rethrow => &[],
        }
    }

    /// Minified definition, named `pug_<name>`.
    pub fn source(self) -> &'static str {
        match self {
            Helper::Attr => r#"function pug_attr(t,e,n,r){if(!1===e||null==e||!e&&("class"===t||"style"===t))return"";if(!0===e)return" "+(r?t:t+'="'+t+'"');var f=typeof e;return"object"!==f&&"function"!==f||"function"!=typeof e.toJSON||(e=e.toJSON()),"string"==typeof e||(e=JSON.stringify(e),n||-1===e.indexOf('"'))?(n&&(e=pug_escape(e))," "+t+'="'+e+'"'):" "+t+"='"+e.replace(/'/g,"&#39;")+"'"}"#,
            Helper::Attrs => r#"function pug_attrs(t,r){var a="";for(var s in t)if(pug_has_own_property.call(t,s)){var u=t[s];if("class"===s){u=pug_classes(u),a=pug_attr(s,u,!1,r)+a;continue}"style"===s&&(u=pug_style(u)),a+=pug_attr(s,u,!1,r)}return a}"#,
            Helper::Classes => r#"function pug_classes(s,r){return Array.isArray(s)?pug_classes_array(s,r):s&&"object"==typeof s?pug_classes_object(s):s||""}"#,
            Helper::ClassesArray => r#"function pug_classes_array(r,a){for(var s,e="",u="",c=Array.isArray(a),g=0;g<r.length;g++)(s=pug_classes(r[g]))&&(c&&a[g]&&(s=pug_escape(s)),e=e+u+s,u=" ");return e}"#,
            Helper::ClassesObject => r#"function pug_classes_object(r){var a="",n="";for(var o in r)o&&r[o]&&pug_has_own_property.call(r,o)&&(a=a+n+o,n=" ");return a}"#,
            Helper::Escape => r#"function pug_escape(e){var a=""+e,t=pug_match_html.exec(a);if(!t)return e;var r,c,n,s="";for(r=t.index,c=0;r<a.length;r++){switch(a.charCodeAt(r)){case 34:n="&quot;";break;case 38:n="&amp;";break;case 60:n="&lt;";break;case 62:n="&gt;";break;default:continue}c!==r&&(s+=a.substring(c,r)),c=r+1,s+=n}return c!==r?s+a.substring(c,r):s}"#,
            Helper::HasOwnProperty => r#"var pug_has_own_property=Object.prototype.hasOwnProperty;"#,
            Helper::MatchHtml => r#"var pug_match_html=/["&<>]/;"#,
            Helper::Merge => r#"function pug_merge(e,r){if(1===arguments.length){for(var t=e[0],g=1;g<e.length;g++)t=pug_merge(t,e[g]);return t}for(var l in r)if("class"===l){var n=e[l]||[];e[l]=(Array.isArray(n)?n:[n]).concat(r[l]||[])}else if("style"===l){var n=pug_style(e[l]);n=n&&";"!==n[n.length-1]?n+";":n;var a=pug_style(r[l]);a=a&&";"!==a[a.length-1]?a+";":a,e[l]=n+a}else e[l]=r[l];return e}"#,
            Helper::Rethrow => r#"function pug_rethrow(e,n,r,t){if(!(e instanceof Error))throw e;if(!("undefined"==typeof window&&n||t))throw e.message+=" on line "+r,e;var o,a,i,s;try{t=t||require("fs").readFileSync(n,{encoding:"utf8"}),o=3,a=t.split("\n"),i=Math.max(r-o,0),s=Math.min(a.length,r+o)}catch(t){return e.message+=" - could not read from "+n+" ("+t.message+")",void pug_rethrow(e,null,r)}o=a.slice(i,s).map(function(e,n){var t=n+i+1;return(t==r?"  > ":"    ")+t+"| "+e}).join("\n"),e.path=n;try{e.message=(n||"Pug")+":"+r+"\n"+o+"\n\n"+e.message}catch(e){}throw e}"#,
            Helper::Style => r#"function pug_style(r){if(!r)return"";if("object"==typeof r){var t="";for(var e in r)pug_has_own_property.call(r,e)&&(t=t+e+":"+r[e]+";");return t}return r+""}"#,
        }
    }
}

/// Sources of the public helpers in `used` and everything they depend on,
/// one definition per line, sorted by name. Internal helpers in `used` are
/// ignored: they are pulled in only as dependencies.
pub fn build(used: impl IntoIterator<Item = Helper>) -> String {
    let mut pending: Vec<Helper> = used.into_iter().filter(|h| h.is_public()).collect();
    let mut included = BTreeSet::new();
    while let Some(helper) = pending.pop() {
        if included.insert(helper) {
            pending.extend_from_slice(helper.dependencies());
        }
    }
    included
        .into_iter()
        .map(Helper::source)
        .collect::<Vec<_>>()
        .join("\n")
}
