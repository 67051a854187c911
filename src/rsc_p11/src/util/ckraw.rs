// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::iter::Iterator;

use crate::codec::Attribute;
use crate::pkcs11;

/// A caller-owned `CK_ATTRIBUTE`.
pub struct CkRawAttr(pkcs11::CK_ATTRIBUTE_PTR);

impl CkRawAttr {
    pub unsafe fn from_raw_ptr_unchecked(ptr: pkcs11::CK_ATTRIBUTE_PTR) -> Self {
        Self(ptr)
    }

    pub fn type_(&self) -> pkcs11::CK_ATTRIBUTE_TYPE {
        unsafe { (*self.0).type_ }
    }

    pub fn len(&self) -> pkcs11::CK_ULONG {
        unsafe { (*self.0).ulValueLen }
    }

    pub fn set_type(&mut self, type_: pkcs11::CK_ATTRIBUTE_TYPE) {
        unsafe {
            (*self.0).type_ = type_;
        }
    }

    pub fn set_len(&mut self, len: pkcs11::CK_ULONG) {
        unsafe {
            (*self.0).ulValueLen = len;
        }
    }

    /// A codec view of this attribute. The value slice spans the caller-declared length.
    ///
    /// Unsafe since the returned lifetime is unbounded: the caller must make sure the view
    /// does not outlive the foreign buffer.
    unsafe fn as_attribute<'a>(&self) -> Attribute<'a> {
        let val_ptr = (*self.0).pValue;
        let len = self.len();
        let value = if val_ptr.is_null() || len == pkcs11::CK_UNAVAILABLE_INFORMATION {
            None
        } else {
            Some(std::slice::from_raw_parts_mut(val_ptr as *mut u8, len as usize))
        };
        Attribute {
            type_: self.type_(),
            value,
            len,
        }
    }
}

/// A caller-owned `CK_ATTRIBUTE` array.
pub struct CkRawAttrTemplate {
    ptr: pkcs11::CK_ATTRIBUTE_PTR,
    count: usize,
}

impl CkRawAttrTemplate {
    pub unsafe fn from_raw_ptr_unchecked(ptr: pkcs11::CK_ATTRIBUTE_PTR, count: usize) -> Self {
        Self { ptr, count }
    }

    pub fn attr_wrapper(&self, index: usize) -> Option<CkRawAttr> {
        if index >= self.count {
            return None;
        }
        Some(unsafe { CkRawAttr::from_raw_ptr_unchecked(self.ptr.add(index)) })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn iter(&self) -> CkRawAttrTemplateIter {
        CkRawAttrTemplateIter {
            tpl: self,
            index: 0,
        }
    }

    /// Run `f` over a read-only codec view of the template.
    pub fn with_attrs<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Attribute]) -> R,
    {
        let attrs: Vec<Attribute> = self
            .iter()
            .map(|raw| unsafe { raw.as_attribute() })
            .collect();
        f(attrs.as_slice())
    }

    /// Run `f` over a mutable codec view of the template, then write the resulting types and
    /// lengths back into the caller's `CK_ATTRIBUTE`s. Value bytes are written in place by `f`.
    pub fn with_attrs_mut<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut [Attribute]) -> R,
    {
        let mut attrs: Vec<Attribute> = self
            .iter()
            .map(|raw| unsafe { raw.as_attribute() })
            .collect();
        let ret = f(attrs.as_mut_slice());
        let updates: Vec<(pkcs11::CK_ATTRIBUTE_TYPE, pkcs11::CK_ULONG)> =
            attrs.iter().map(|attr| (attr.type_, attr.len)).collect();
        drop(attrs);

        for (mut raw, (type_, len)) in self.iter().zip(updates.into_iter()) {
            raw.set_type(type_);
            raw.set_len(len);
        }
        ret
    }
}

pub struct CkRawAttrTemplateIter<'a> {
    tpl: &'a CkRawAttrTemplate,
    index: usize,
}

impl<'a> Iterator for CkRawAttrTemplateIter<'a> {
    type Item = CkRawAttr;
    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.tpl.len() {
            let ret = self.tpl.attr_wrapper(self.index);
            self.index += 1;
            ret
        } else {
            None
        }
    }
}

/// A caller-owned `CK_MECHANISM`. Parameters are forwarded as opaque bytes.
pub struct CkRawMechanism {
    ptr: pkcs11::CK_MECHANISM_PTR,
}

impl CkRawMechanism {
    pub unsafe fn from_raw_ptr_unchecked(ptr: pkcs11::CK_MECHANISM_PTR) -> Self {
        Self { ptr }
    }

    pub fn type_(&self) -> pkcs11::CK_MECHANISM_TYPE {
        unsafe { (*self.ptr).mechanism }
    }

    pub fn param_bytes(&self) -> Option<&[u8]> {
        let (param_ptr, param_len) = unsafe { ((*self.ptr).pParameter, (*self.ptr).ulParameterLen) };
        if param_ptr.is_null() || param_len == 0 {
            return None;
        }
        Some(unsafe { std::slice::from_raw_parts(param_ptr as *const u8, param_len as usize) })
    }
}
